//! Employment positions. These are the one section clustered into employer
//! groups, so resolution goes through the grouped fallback chain.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::ExportError;
use crate::graph::{get_elements_through_group, Entity, EntityGraph, Paging};
use crate::normalize::extract_date_range;
use crate::resume::records::WorkRecord;
use crate::sections::keys::{WORK_GROUPS, WORK_PAGING_KEYS};
use crate::sections::{capture_result, CaptureResult, ParseContext, Section};

static COMPANY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"urn.+Company:(\d+)").unwrap());

/// Company page for a company URN: the resolved company entity's own `url`
/// when the graph has one, otherwise a page URL built from the numeric id.
pub fn company_page_url(graph: &EntityGraph, company_urn: Option<&str>) -> String {
    let Some(urn) = company_urn else {
        return String::new();
    };
    if let Some(url) = graph
        .get_element_by_urn(urn)
        .and_then(|company| company.string(&["url"]))
    {
        return url;
    }
    COMPANY_ID
        .captures(urn)
        .and_then(|caps| caps.get(1))
        .map(|id| format!("https://www.linkedin.com/company/{}", id.as_str()))
        .unwrap_or_default()
}

pub(crate) fn company_urn(entity: &Entity) -> Option<&str> {
    entity.str_field(&["companyUrn", "*company"])
}

pub fn map_work(graph: &EntityGraph, ctx: &mut ParseContext) -> Result<CaptureResult, ExportError> {
    let toc_paging = graph
        .paging_for_keys(WORK_PAGING_KEYS)
        .or_else(|| graph.table_of_contents().paging());
    let Some(resolution) = get_elements_through_group(graph, &WORK_GROUPS) else {
        return Ok(capture_result(0, toc_paging));
    };
    // Positions beyond a group's first page leave the section incomplete even
    // when every group arrived.
    let paging = Paging::combined(toc_paging.into_iter().chain(resolution.member_paging));
    ctx.note_order(Section::Work, resolution.order);

    for position in &resolution.entities {
        ctx.documents.push(WorkRecord {
            company: position.string(&["companyName"]).unwrap_or_default(),
            position: position.string(&["title"]).unwrap_or_default(),
            company_url: company_page_url(graph, company_urn(position)),
            location: position.string(&["locationName", "geoLocationName"]),
            summary: position.string(&["description"]).unwrap_or_default(),
            dates: extract_date_range(position),
        });
    }
    Ok(capture_result(resolution.entities.len(), paging))
}
