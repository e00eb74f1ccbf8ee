//! Sequential pagination driver for section endpoints.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::acquisition::fetcher::{EndpointVars, ProfileFetcher};
use crate::errors::ExportError;
use crate::graph::NormalizedResponse;
use crate::sections::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationPolicy {
    pub page_size: u64,
    /// Hard ceiling on requests per section.
    pub request_limit: u32,
    /// Pause between consecutive requests.
    pub throttle: Duration,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            page_size: 20,
            request_limit: 100,
            throttle: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationOutcome {
    Complete,
    CeilingReached,
    /// A request failed after at least one page had been collected.
    BailedOut,
}

#[derive(Debug)]
pub struct PagedFetch {
    pub pages: Vec<NormalizedResponse>,
    pub outcome: PaginationOutcome,
    pub requests: u32,
}

/// Walks `{start, count, total}` from offset 0 until the total is reached,
/// the request ceiling is hit, or a request fails.
pub async fn fetch_all_pages(
    fetcher: &dyn ProfileFetcher,
    section: Section,
    endpoint: &str,
    vars: &EndpointVars,
    locale: Option<&str>,
    policy: &PaginationPolicy,
) -> Result<PagedFetch, ExportError> {
    let mut pages = Vec::new();
    let mut requests = 0u32;
    let mut start = 0u64;

    let outcome = loop {
        requests += 1;
        let page = match fetcher
            .fetch(endpoint, &vars.page(start, policy.page_size), locale)
            .await
        {
            Ok(page) => page,
            Err(e) if pages.is_empty() => {
                return Err(ExportError::PaginationBailout {
                    section,
                    pages: 0,
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                warn!(%section, pages = pages.len(), error = %e, "pagination bailed out, keeping collected pages");
                break PaginationOutcome::BailedOut;
            }
        };

        let paging = page.data.paging();
        pages.push(page);

        let Some(paging) = paging else {
            break PaginationOutcome::Complete;
        };
        let next = paging.start.saturating_add(paging.count);
        let done = paging.count == 0 || paging.total.map_or(true, |total| next >= total);
        if done {
            break PaginationOutcome::Complete;
        }
        if requests >= policy.request_limit {
            warn!(%section, requests, "pagination request ceiling reached");
            break PaginationOutcome::CeilingReached;
        }

        debug!(%section, next, total = ?paging.total, "fetching next page");
        tokio::time::sleep(policy.throttle).await;
        start = next;
    };

    Ok(PagedFetch {
        pages,
        outcome,
        requests,
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::{api_error, page, ScriptedFetcher};
    use super::*;

    fn policy() -> PaginationPolicy {
        PaginationPolicy {
            page_size: 20,
            request_limit: 100,
            throttle: Duration::from_millis(100),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_pages_exactly_three_requests() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(page(0, 20, 45, vec![])),
            Ok(page(20, 20, 45, vec![])),
            Ok(page(40, 5, 45, vec![])),
            Ok(page(45, 0, 45, vec![])),
        ]);
        let started = tokio::time::Instant::now();
        let result = fetch_all_pages(
            &fetcher,
            Section::Skills,
            "/skills?start={start}&count={count}",
            &EndpointVars::for_profile("ada"),
            None,
            &policy(),
        )
        .await
        .unwrap();

        assert_eq!(result.outcome, PaginationOutcome::Complete);
        assert_eq!(result.requests, 3);
        assert_eq!(result.pages.len(), 3);
        assert_eq!(fetcher.call_count(), 3);
        assert_eq!(started.elapsed(), Duration::from_millis(200));

        let starts: Vec<u64> = fetcher.calls.lock().unwrap().iter().map(|(_, v)| v.start).collect();
        assert_eq!(starts, vec![0, 20, 40]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bail_out_keeps_collected_pages() {
        let fetcher = ScriptedFetcher::new(vec![Ok(page(0, 20, 45, vec![])), Err(api_error())]);
        let result = fetch_all_pages(
            &fetcher,
            Section::Skills,
            "/skills",
            &EndpointVars::default(),
            None,
            &policy(),
        )
        .await
        .unwrap();
        assert_eq!(result.outcome, PaginationOutcome::BailedOut);
        assert_eq!(result.pages.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_with_nothing_collected_is_error() {
        let fetcher = ScriptedFetcher::new(vec![Err(api_error())]);
        let err = fetch_all_pages(
            &fetcher,
            Section::Work,
            "/groups",
            &EndpointVars::default(),
            None,
            &policy(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ExportError::PaginationBailout { section: Section::Work, pages: 0, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_ceiling() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(page(0, 20, 100, vec![])),
            Ok(page(20, 20, 100, vec![])),
            Ok(page(40, 20, 100, vec![])),
        ]);
        let limited = PaginationPolicy {
            request_limit: 2,
            ..policy()
        };
        let result = fetch_all_pages(
            &fetcher,
            Section::Skills,
            "/skills",
            &EndpointVars::default(),
            None,
            &limited,
        )
        .await
        .unwrap();
        assert_eq!(result.outcome, PaginationOutcome::CeilingReached);
        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_paging_is_single_page() {
        let fetcher = ScriptedFetcher::new(vec![Ok(NormalizedResponse::default())]);
        let result = fetch_all_pages(
            &fetcher,
            Section::Skills,
            "/skills",
            &EndpointVars::default(),
            None,
            &policy(),
        )
        .await
        .unwrap();
        assert_eq!(result.outcome, PaginationOutcome::Complete);
        assert_eq!(result.requests, 1);
    }
}
