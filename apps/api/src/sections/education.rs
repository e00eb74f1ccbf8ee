use crate::errors::ExportError;
use crate::graph::{Entity, EntityGraph};
use crate::normalize::extract_date_range;
use crate::resume::records::EducationRecord;
use crate::sections::keys::EDUCATION;
use crate::sections::{capture_result, resolve_section, CaptureResult, ParseContext, Section};

const COURSE_KEYS: [&str; 2] = ["courses", "*courses"];

/// Courses as `"<number> - <name>"`, or just the name when unnumbered.
fn course_titles(graph: &EntityGraph, education: &Entity) -> Vec<String> {
    COURSE_KEYS
        .iter()
        .flat_map(|key| graph.resolve_field(education, key))
        .filter_map(|course| {
            let name = course.str_field(&["name"])?;
            Some(match course.str_field(&["number"]) {
                Some(number) => format!("{number} - {name}"),
                None => name.to_string(),
            })
        })
        .collect()
}

fn institution(graph: &EntityGraph, education: &Entity) -> String {
    education
        .string(&["schoolName"])
        .or_else(|| {
            ["*school", "*miniSchool"]
                .iter()
                .flat_map(|key| graph.resolve_field(education, key))
                .find_map(|school| school.string(&["name", "schoolName"]))
        })
        .unwrap_or_default()
}

pub fn map_education(graph: &EntityGraph, ctx: &mut ParseContext) -> Result<CaptureResult, ExportError> {
    let source = resolve_section(graph, &EDUCATION);
    ctx.note_order(Section::Education, source.order);

    for education in &source.entities {
        ctx.documents.push(EducationRecord {
            institution: institution(graph, education),
            area: education.string(&["fieldOfStudy"]).unwrap_or_default(),
            study_type: education.string(&["degreeName"]).unwrap_or_default(),
            grade: education.string(&["grade"]).unwrap_or_default(),
            courses: course_titles(graph, education),
            dates: extract_date_range(education),
        });
    }
    Ok(capture_result(source.entities.len(), source.paging))
}
