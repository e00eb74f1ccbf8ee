//! Rich-media attachments. These mostly hold links, so they are sorted into
//! the GitHub profile, the personal website, and (for the rest) projects.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::errors::ExportError;
use crate::graph::{Entity, EntityGraph};
use crate::resume::common::Profile;
use crate::resume::records::{BasicsPatch, ProjectRecord};
use crate::sections::keys::ATTACHMENTS;
use crate::sections::{capture_result, resolve_section, CaptureResult, ParseContext, Section};

static GITHUB_USER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)github\.com/([^/?#\s]+)").unwrap());

fn attachment_url(entity: &Entity) -> Option<String> {
    entity
        .string(&["url"])
        .or_else(|| {
            ["data", "link"].iter().find_map(|field| {
                entity
                    .get(field)?
                    .get("url")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
        })
}

/// GitHub username from a link, when the link points at GitHub.
pub fn github_username(url: &str) -> Option<String> {
    GITHUB_USER
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn map_attachments(graph: &EntityGraph, ctx: &mut ParseContext) -> Result<CaptureResult, ExportError> {
    let source = resolve_section(graph, &ATTACHMENTS);
    ctx.note_order(Section::Attachments, source.order);

    let mut captured = 0;
    for entity in &source.entities {
        let Some(url) = attachment_url(entity) else {
            continue;
        };
        captured += 1;

        let first_github = github_username(&url).filter(|_| !ctx.documents.has_profile_network("GitHub"));
        if let Some(username) = first_github {
            ctx.documents.push_profile(Profile {
                network: "GitHub".to_string(),
                username,
                url,
            });
            continue;
        }
        if !ctx.documents.has_website() {
            ctx.documents.push(BasicsPatch {
                website: Some(url),
                ..BasicsPatch::default()
            });
            continue;
        }

        ctx.documents.push_attachment_project(ProjectRecord {
            name: entity.string(&["title"]).unwrap_or_default(),
            description: entity.string(&["description"]).unwrap_or_default(),
            url,
            ..ProjectRecord::default()
        });
    }
    Ok(capture_result(captured, source.paging))
}
