//! Certificates, awards and publications: flat lists with one optional date each.

use crate::errors::ExportError;
use crate::graph::EntityGraph;
use crate::normalize::{extract_date_range, extract_single_date};
use crate::resume::records::{AwardRecord, CertificateRecord, PublicationRecord};
use crate::sections::keys::{AWARDS, CERTIFICATES, PUBLICATIONS};
use crate::sections::{capture_result, resolve_section, CaptureResult, ParseContext, Section};

pub fn map_certificates(graph: &EntityGraph, ctx: &mut ParseContext) -> Result<CaptureResult, ExportError> {
    let source = resolve_section(graph, &CERTIFICATES);
    ctx.note_order(Section::Certificates, source.order);

    for certificate in &source.entities {
        ctx.documents.push(CertificateRecord {
            name: certificate.string(&["name"]).unwrap_or_default(),
            issuer: certificate.string(&["authority"]).unwrap_or_default(),
            url: certificate.string(&["url"]).unwrap_or_default(),
            date: extract_date_range(certificate).start,
        });
    }
    Ok(capture_result(source.entities.len(), source.paging))
}

pub fn map_awards(graph: &EntityGraph, ctx: &mut ParseContext) -> Result<CaptureResult, ExportError> {
    let source = resolve_section(graph, &AWARDS);
    ctx.note_order(Section::Awards, source.order);

    for award in &source.entities {
        ctx.documents.push(AwardRecord {
            title: award.string(&["title"]).unwrap_or_default(),
            awarder: award.string(&["issuer"]).unwrap_or_default(),
            summary: award.string(&["description"]).unwrap_or_default(),
            date: extract_single_date(award, &["issueDate", "issuedOn"]),
        });
    }
    Ok(capture_result(source.entities.len(), source.paging))
}

pub fn map_publications(graph: &EntityGraph, ctx: &mut ParseContext) -> Result<CaptureResult, ExportError> {
    let source = resolve_section(graph, &PUBLICATIONS);
    ctx.note_order(Section::Publications, source.order);

    for publication in &source.entities {
        ctx.documents.push(PublicationRecord {
            name: publication.string(&["name"]).unwrap_or_default(),
            publisher: publication.string(&["publisher"]).unwrap_or_default(),
            url: publication.string(&["url"]).unwrap_or_default(),
            summary: publication.string(&["description"]).unwrap_or_default(),
            release_date: extract_single_date(publication, &["date", "publishedOn"]),
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
    fn test_certificates_take_start_date() {
        let g = graph(json!({
            "data": { "*profileCertifications": { "*elements": ["c1"] } },
            "included": [{
                "entityUrn": "c1",
                "name": "CKA",
                "authority": "CNCF",
                "url": "https://cert.example/1",
                "dateRange": { "start": { "year": 2021, "month": 4 } }
            }]
        }));
        let mut ctx = ParseContext::default();
        assert_eq!(map_certificates(&g, &mut ctx).unwrap(), CaptureResult::Success);
        let cert = &ctx.documents.stable.certificates[0];
        assert_eq!(cert.issuer, "CNCF");
        assert_eq!(cert.date.as_deref(), Some("2021-04-01"));
    }

    #[test]
    fn test_awards_read_both_date_names() {
        let g = graph(json!({
            "data": { "*honorView": ["h1", "h2"] },
            "included": [
                { "entityUrn": "h1", "title": "Medal", "issuer": "Society", "issueDate": { "year": 2001, "month": 5 } },
                { "entityUrn": "h2", "title": "Prize", "issuedOn": { "year": 2003 }, "description": "Best paper" }
            ]
        }));
        let mut ctx = ParseContext::default();
        map_awards(&g, &mut ctx).unwrap();
        let awards = &ctx.documents.legacy.awards;
        assert_eq!(awards[0].awarder, "Society");
        assert_eq!(awards[0].date.as_deref(), Some("2001-05-01"));
        assert_eq!(awards[1].date.as_deref(), Some("2003-01-01"));
        assert_eq!(awards[1].summary, "Best paper");
        assert_eq!(ctx.documents.stable.awards, *awards);
    }

    #[test]
    fn test_publications_map_url_per_schema() {
        let g = graph(json!({
            "data": { "*publicationView": "urn:view" },
            "included": [
                { "entityUrn": "urn:view", "elements": ["p1"], "paging": { "start": 0, "count": 1, "total": 1 } },
                {
                    "entityUrn": "p1",
                    "name": "Sketch of the Engine",
                    "publisher": "Taylor",
                    "url": "https://pub.example",
                    "date": { "year": 1843, "month": 10, "day": 2 }
                }
            ]
        }));
        let mut ctx = ParseContext::default();
        map_publications(&g, &mut ctx).unwrap();
        assert_eq!(ctx.documents.legacy.publications[0].website, "https://pub.example");
        assert_eq!(ctx.documents.stable.publications[0].url, "https://pub.example");
        assert_eq!(
            ctx.documents.stable.publications[0].release_date.as_deref(),
            Some("1843-10-02")
        );
    }

    #[test]
    fn test_empty_sections() {
        let g = graph(json!({ "data": {}, "included": [] }));
        let mut ctx = ParseContext::default();
        assert_eq!(map_certificates(&g, &mut ctx).unwrap(), CaptureResult::Empty);
        assert_eq!(map_awards(&g, &mut ctx).unwrap(), CaptureResult::Empty);
        assert_eq!(map_publications(&g, &mut ctx).unwrap(), CaptureResult::Empty);
    }
}
