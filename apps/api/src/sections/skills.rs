use crate::errors::ExportError;
use crate::graph::EntityGraph;
use crate::resume::records::SkillRecord;
use crate::sections::keys::SKILLS;
use crate::sections::{capture_result, resolve_section, CaptureResult, ParseContext, Section};

/// Skills are the only de-duplicated section: an exact name already present is skipped.
pub fn map_skills(graph: &EntityGraph, ctx: &mut ParseContext) -> Result<CaptureResult, ExportError> {
    let source = resolve_section(graph, &SKILLS);
    ctx.note_order(Section::Skills, source.order);

    let mut captured = 0;
    for skill in &source.entities {
        let Some(name) = skill.string(&["name"]) else {
            continue;
        };
        captured += 1;
        if ctx.documents.has_skill(&name) {
            continue;
        }
        ctx.documents.push(SkillRecord { name });
    }
    Ok(capture_result(captured, source.paging))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::test_support::graph;
    use serde_json::json;

    #[test]
    fn test_skills_dedup_by_exact_name() {
        let g = graph(json!({
            "data": { "*skillView": ["s1", "s2", "s3", "s4"] },
            "included": [
                { "entityUrn": "s1", "name": "Rust" },
                { "entityUrn": "s2", "name": "rust" },
                { "entityUrn": "s3", "name": "Rust" },
                { "entityUrn": "s4", "name": "SQL" }
            ]
        }));
        let mut ctx = ParseContext::default();
        assert_eq!(map_skills(&g, &mut ctx).unwrap(), CaptureResult::Success);
        let names: Vec<_> = ctx.documents.stable.skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Rust", "rust", "SQL"]);
        assert_eq!(ctx.documents.legacy.skills.len(), 3);
    }
}
