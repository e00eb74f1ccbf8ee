use crate::errors::ExportError;
use crate::graph::EntityGraph;
use crate::resume::records::LanguageRecord;
use crate::sections::keys::LANGUAGES;
use crate::sections::{capture_result, resolve_section, CaptureResult, ParseContext, Section};

/// Human label for a source proficiency code. Unknown codes pass through unchanged.
pub fn fluency_label(code: &str) -> String {
    match code {
        "ELEMENTARY" => "Elementary proficiency",
        "LIMITED_WORKING" => "Limited working proficiency",
        "PROFESSIONAL_WORKING" => "Professional working proficiency",
        "FULL_PROFESSIONAL" => "Full professional proficiency",
        "NATIVE_OR_BILINGUAL" => "Native or bilingual proficiency",
        other => other,
    }
    .to_string()
}

pub fn map_languages(graph: &EntityGraph, ctx: &mut ParseContext) -> Result<CaptureResult, ExportError> {
    let source = resolve_section(graph, &LANGUAGES);
    ctx.note_order(Section::Languages, source.order);

    let mut captured = 0;
    for entity in &source.entities {
        let Some(language) = entity.string(&["name"]) else {
            continue;
        };
        ctx.documents.push(LanguageRecord {
            language,
            fluency: entity
                .str_field(&["proficiency"])
                .map(fluency_label)
                .unwrap_or_default(),
        });
        captured += 1;
    }
    Ok(capture_result(captured, source.paging))
}
