use crate::errors::ExportError;
use crate::graph::EntityGraph;
use crate::normalize::extract_date_range;
use crate::resume::records::VolunteerRecord;
use crate::sections::keys::VOLUNTEER;
use crate::sections::work::{company_page_url, company_urn};
use crate::sections::{capture_result, resolve_section, CaptureResult, ParseContext, Section};

pub fn map_volunteer(graph: &EntityGraph, ctx: &mut ParseContext) -> Result<CaptureResult, ExportError> {
    let source = resolve_section(graph, &VOLUNTEER);
    ctx.note_order(Section::Volunteer, source.order);

    for experience in &source.entities {
        ctx.documents.push(VolunteerRecord {
            organization: experience.string(&["companyName"]).unwrap_or_default(),
            position: experience.string(&["role"]).unwrap_or_default(),
            organization_url: company_page_url(graph, company_urn(experience)),
            summary: experience.string(&["description"]).unwrap_or_default(),
            dates: extract_date_range(experience),
        });
    }
    Ok(capture_result(source.entities.len(), source.paging))
}
