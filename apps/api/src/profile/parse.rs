//! One parse attempt: response → graph → every section mapper → summary.
//!
//! Mapper faults are contained here. They end the attempt early and are
//! reported through the summary, never returned as errors.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::ExportError;
use crate::graph::{Entity, EntityGraph, NormalizedResponse};
use crate::normalize::{locale_tag, localize_response};
use crate::resume::ResumeDocuments;
use crate::sections::basics::find_profile;
use crate::sections::keys::PROFILE;
use crate::sections::{CaptureResult, ParseContext, Section};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionMethod {
    /// Payload embedded in the page markup.
    Embedded,
    /// Authenticated request against the live API.
    LiveFetch,
    /// Response handed in directly by the caller.
    Supplied,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileParseSummary {
    pub attempt_id: Uuid,
    #[serde(skip)]
    pub raw_response: Option<Arc<NormalizedResponse>>,
    pub acquisition_method: AcquisitionMethod,
    pub page_identity: Option<String>,
    pub locale_tag: Option<String>,
    pub succeeded: bool,
    pub sections: BTreeMap<Section, CaptureResult>,
    pub failure: Option<String>,
    pub warnings: Vec<String>,
    pub parsed_at: DateTime<Utc>,
}

impl ProfileParseSummary {
    /// A fresh attempt with every section marked failed.
    pub fn new(method: AcquisitionMethod, page_identity: Option<String>) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            raw_response: None,
            acquisition_method: method,
            page_identity,
            locale_tag: None,
            succeeded: false,
            sections: Section::PARSE_ORDER
                .iter()
                .map(|&s| (s, CaptureResult::Fail))
                .collect(),
            failure: None,
            warnings: Vec::new(),
            parsed_at: Utc::now(),
        }
    }

    /// Summary of an attempt that never got a usable response.
    pub fn acquisition_failed(
        method: AcquisitionMethod,
        page_identity: Option<String>,
        error: &ExportError,
    ) -> Self {
        let mut summary = Self::new(method, page_identity);
        summary.failure = Some(error.to_string());
        summary
    }

    pub fn section(&self, section: Section) -> CaptureResult {
        self.sections
            .get(&section)
            .copied()
            .unwrap_or(CaptureResult::Fail)
    }
}

/// Detects the single-entry-point encoding: the root lists elements, the first
/// of which is the profile, and there is no `*profile` pointer. Returns the
/// response rewritten so the profile's fields sit on the root.
pub fn hoist_single_entry_point(response: &NormalizedResponse) -> Option<NormalizedResponse> {
    if response.data.get("*profile").is_some() {
        return None;
    }
    let graph = EntityGraph::build(response);
    let first = graph.get_elements().into_iter().next()?;
    if !first.is_type(PROFILE.types) {
        return None;
    }
    let urn = first.key()?.to_string();

    let mut fields = first.fields.clone();
    fields.insert("*profile".to_string(), Value::String(urn));
    Some(NormalizedResponse {
        data: Entity {
            type_tag: None,
            entity_urn: None,
            object_urn: None,
            fields,
        },
        included: response.included.clone(),
        meta: response.meta.clone(),
    })
}

/// Locale the profile itself is written in, when the response says.
pub fn response_default_locale(response: &NormalizedResponse) -> Option<String> {
    let graph = EntityGraph::build(response);
    find_profile(&graph)?
        .any_field(&["defaultLocale", "primaryLocale"])
        .and_then(locale_tag)
}

/// Runs every mapper in [`Section::PARSE_ORDER`] over one response.
pub fn parse_profile_response(
    response: Arc<NormalizedResponse>,
    method: AcquisitionMethod,
    page_identity: Option<String>,
    ctx: &mut ParseContext,
) -> ProfileParseSummary {
    let mut summary = ProfileParseSummary::new(method, page_identity);

    let graph = match hoist_single_entry_point(&response) {
        Some(hoisted) => {
            debug!("hoisted single-entry-point profile onto the root");
            EntityGraph::build(&hoisted)
        }
        None => EntityGraph::build(&response),
    };
    summary.raw_response = Some(response);
    debug!(entities = graph.len(), "entity graph built");

    let mut failure = None;
    for section in Section::PARSE_ORDER {
        match (section.mapper())(&graph, ctx) {
            Ok(result) => {
                debug!(%section, ?result, "section mapped");
                summary.sections.insert(section, result);
            }
            Err(e) => {
                warn!(%section, error = %e, "section mapper failed; skipping the rest");
                failure = Some(e.to_string());
                break;
            }
        }
    }

    summary.succeeded = failure.is_none();
    summary.failure = failure;
    summary.locale_tag = ctx.locale_tag.clone();
    summary.warnings = ctx.warnings.clone();
    ctx.documents.set_beta_field(
        &["meta", "lastModified"],
        Value::String(summary.parsed_at.to_rfc3339()),
    );

    info!(
        attempt = %summary.attempt_id,
        method = ?summary.acquisition_method,
        succeeded = summary.succeeded,
        "profile parse finished"
    );
    summary
}

/// Maps one additional page of a single section onto existing documents.
pub fn apply_section_page(
    section: Section,
    response: &NormalizedResponse,
    ctx: &mut ParseContext,
) -> Result<CaptureResult, ExportError> {
    let graph = EntityGraph::build(response);
    (section.mapper())(&graph, ctx)
}

/// Stateless pipeline over a caller-supplied response. When `locale` differs
/// from the profile's own default, locale-wrapped fields are remapped first.
pub fn convert_response(
    mut response: NormalizedResponse,
    profile_id: Option<String>,
    locale: Option<&str>,
) -> (ProfileParseSummary, ResumeDocuments) {
    if let Some(desired) = locale {
        if response_default_locale(&response).as_deref() != Some(desired) {
            localize_response(&mut response, desired);
        }
    }
    let mut ctx = ParseContext::new(ResumeDocuments::default(), profile_id);
    let summary = parse_profile_response(
        Arc::new(response),
        AcquisitionMethod::Supplied,
        None,
        &mut ctx,
    );
    (summary, ctx.documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::SchemaVersion;
    use serde_json::json;

    fn response(value: Value) -> NormalizedResponse {
        serde_json::from_value(value).unwrap()
    }

    fn profile_view() -> NormalizedResponse {
        response(json!({
            "data": {
                "*profile": "urn:li:fs_profile:A1",
                "*skillView": "urn:skills",
                "*educationView": "urn:edu"
            },
            "included": [
                {
                    "$type": "com.linkedin.voyager.identity.profile.Profile",
                    "entityUrn": "urn:li:fs_profile:A1",
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "multiLocaleFirstName": { "fr_FR": "Adèle" },
                    "defaultLocale": { "language": "en", "country": "US" }
                },
                { "entityUrn": "urn:skills", "*elements": ["s1"], "paging": { "start": 0, "count": 20, "total": 1 } },
                { "entityUrn": "s1", "name": "Mathematics" },
                { "entityUrn": "urn:edu", "*elements": [], "paging": { "start": 0, "count": 10, "total": 0 } }
            ]
        }))
    }

    #[test]
    fn test_parse_fills_every_section_status() {
        let mut ctx = ParseContext::default();
        let summary = parse_profile_response(
            Arc::new(profile_view()),
            AcquisitionMethod::Supplied,
            None,
            &mut ctx,
        );
        assert!(summary.succeeded);
        assert_eq!(summary.sections.len(), 11);
        assert_eq!(summary.section(Section::Basics), CaptureResult::Success);
        assert_eq!(summary.section(Section::Skills), CaptureResult::Success);
        assert_eq!(summary.section(Section::Education), CaptureResult::Empty);
        assert_eq!(summary.locale_tag.as_deref(), Some("en_US"));
        assert_eq!(ctx.documents.stable.basics.name, "Ada Lovelace");
        assert!(summary.raw_response.is_some());
    }

    #[test]
    fn test_mapper_fault_is_data_not_error() {
        let mut ctx = ParseContext::default();
        let summary = parse_profile_response(
            Arc::new(response(json!({ "data": {}, "included": [] }))),
            AcquisitionMethod::Embedded,
            Some("ada".into()),
            &mut ctx,
        );
        assert!(!summary.succeeded);
        assert!(summary.failure.as_deref().unwrap().contains("basics"));
        assert!(summary
            .sections
            .values()
            .all(|result| *result == CaptureResult::Fail));
    }

    #[test]
    fn test_single_entry_point_is_hoisted() {
        let resp = response(json!({
            "data": { "*elements": ["urn:li:fsd_profile:A1"] },
            "included": [
                {
                    "$type": "com.linkedin.voyager.dash.identity.profile.Profile",
                    "entityUrn": "urn:li:fsd_profile:A1",
                    "firstName": "Ada",
                    "*profileSkills": { "*elements": ["s1"], "paging": { "start": 0, "count": 1, "total": 1 } }
                },
                { "entityUrn": "s1", "name": "Rust" }
            ]
        }));
        let hoisted = hoist_single_entry_point(&resp).unwrap();
        assert_eq!(hoisted.data.get("*profile"), Some(&json!("urn:li:fsd_profile:A1")));

        let mut ctx = ParseContext::default();
        let summary =
            parse_profile_response(Arc::new(resp), AcquisitionMethod::LiveFetch, None, &mut ctx);
        assert!(summary.succeeded);
        assert_eq!(ctx.documents.stable.skills[0].name, "Rust");
        assert_eq!(ctx.profile_urn_id.as_deref(), Some("A1"));
    }

    #[test]
    fn test_profile_view_is_not_hoisted() {
        assert!(hoist_single_entry_point(&profile_view()).is_none());
    }

    #[test]
    fn test_convert_remaps_locale_when_it_differs() {
        let (summary, docs) = convert_response(profile_view(), Some("ada".into()), Some("fr_FR"));
        assert!(summary.succeeded);
        assert_eq!(docs.stable.basics.name, "Adèle Lovelace");

        let (_, docs) = convert_response(profile_view(), None, Some("en_US"));
        assert_eq!(docs.stable.basics.name, "Ada Lovelace");
    }

    #[test]
    fn test_beta_document_carries_last_modified() {
        let (summary, docs) = convert_response(profile_view(), None, None);
        let beta = docs.document(SchemaVersion::Beta).unwrap();
        assert_eq!(beta["meta"]["lastModified"], json!(summary.parsed_at.to_rfc3339()));
    }

    #[test]
    fn test_summary_serializes_sections_by_name() {
        let summary = ProfileParseSummary::new(AcquisitionMethod::LiveFetch, None);
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["sections"]["publications"], "fail");
        assert_eq!(value["acquisition_method"], "live_fetch");
        assert!(value.get("raw_response").is_none());
    }
}
