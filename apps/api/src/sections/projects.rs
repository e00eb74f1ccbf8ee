use crate::errors::ExportError;
use crate::graph::EntityGraph;
use crate::normalize::extract_date_range;
use crate::resume::records::ProjectRecord;
use crate::sections::keys::PROJECTS;
use crate::sections::{capture_result, resolve_section, CaptureResult, ParseContext, Section};

pub fn map_projects(graph: &EntityGraph, ctx: &mut ParseContext) -> Result<CaptureResult, ExportError> {
    let source = resolve_section(graph, &PROJECTS);
    ctx.note_order(Section::Projects, source.order);

    for project in &source.entities {
        ctx.documents.push(ProjectRecord {
            name: project.string(&["title"]).unwrap_or_default(),
            description: project.string(&["description"]).unwrap_or_default(),
            url: project.string(&["url"]).unwrap_or_default(),
            dates: extract_date_range(project),
        });
    }
    Ok(capture_result(source.entities.len(), source.paging))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::test_support::graph;
    use serde_json::json;

    #[test]
    fn test_projects_are_stable_only() {
        let g = graph(json!({
            "data": { "*projectView": "urn:view" },
            "included": [
                { "entityUrn": "urn:view", "*elements": ["p1"] },
                {
                    "entityUrn": "p1",
                    "title": "Analytical Engine",
                    "description": "Programs",
                    "url": "https://engine.example",
                    "timePeriod": { "startDate": { "year": 1842 }, "endDate": { "year": 1843, "month": 9 } }
                }
            ]
        }));
        let mut ctx = ParseContext::default();
        assert_eq!(map_projects(&g, &mut ctx).unwrap(), CaptureResult::Success);

        let project = &ctx.documents.stable.projects[0];
        assert_eq!(project.name, "Analytical Engine");
        assert_eq!(project.start_date.as_deref(), Some("1842-01-01"));
        assert_eq!(project.end_date.as_deref(), Some("1843-09-30"));
        let legacy = serde_json::to_value(&ctx.documents.legacy).unwrap();
        assert!(legacy.get("projects").is_none());
    }
}
