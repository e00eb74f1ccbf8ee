//! Live fetcher: authenticated requests against the profile API.
//!
//! The pipeline only sees the [`ProfileFetcher`] trait; [`VoyagerClient`] is the
//! production implementation. Session credentials are opaque configured values.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::graph::NormalizedResponse;
use crate::sections::Section;

const NORMALIZED_ACCEPT: &str = "application/vnd.linkedin.normalized+json+2.1";
const RESTLI_PROTOCOL_VERSION: &str = "2.0.0";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("No session token configured")]
    MissingSession,

    #[error("Endpoint placeholder '{0}' has no value")]
    UnresolvedPlaceholder(&'static str),
}

/// Endpoint templates, relative to the configured base URL.
pub mod endpoints {
    use super::Section;

    pub const PROFILE_VIEW: &str = "/identity/profiles/{profileId}/profileView";
    pub const DASH_FULL_PROFILE: &str = "/identity/dash/profiles?q=memberIdentity&memberIdentity={profileId}&decorationId=com.linkedin.voyager.dash.deco.identity.profile.FullProfileWithEntities-93";
    pub const CONTACT_INFO: &str = "/identity/profiles/{profileId}/profileContactInfo";
    pub const DASH_POSITION_GROUPS: &str = "/identity/dash/profilePositionGroups?q=viewee&profileUrn=urn:li:fsd_profile:{profileUrnId}&decorationId=com.linkedin.voyager.dash.deco.identity.profile.FullProfilePositionGroup-21&start={start}&count={count}";

    /// Paginated endpoint serving one section's entries, where one exists.
    pub fn section_endpoint(section: Section) -> Option<&'static str> {
        Some(match section {
            Section::Work => DASH_POSITION_GROUPS,
            Section::Education => "/identity/profiles/{profileId}/educations?start={start}&count={count}",
            Section::Volunteer => "/identity/profiles/{profileId}/volunteerExperiences?start={start}&count={count}",
            Section::Certificates => "/identity/profiles/{profileId}/certifications?start={start}&count={count}",
            Section::Skills => "/identity/profiles/{profileId}/skills?start={start}&count={count}",
            Section::Projects => "/identity/profiles/{profileId}/projects?start={start}&count={count}",
            Section::Awards => "/identity/profiles/{profileId}/honors?start={start}&count={count}",
            Section::Publications => "/identity/profiles/{profileId}/publications?start={start}&count={count}",
            Section::Languages => "/identity/profiles/{profileId}/languages?start={start}&count={count}",
            Section::Basics | Section::Attachments => return None,
        })
    }
}

/// Values substituted into an endpoint template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointVars {
    pub profile_id: Option<String>,
    pub profile_urn_id: Option<String>,
    pub start: u64,
    pub count: u64,
}

impl EndpointVars {
    pub fn for_profile(profile_id: impl Into<String>) -> Self {
        Self {
            profile_id: Some(profile_id.into()),
            ..Self::default()
        }
    }

    pub fn page(&self, start: u64, count: u64) -> Self {
        Self {
            start,
            count,
            ..self.clone()
        }
    }
}

/// Fills `{profileId}`, `{profileUrnId}`, `{start}` and `{count}`.
/// An id placeholder without a value is an error rather than an empty segment.
pub fn expand_endpoint(template: &str, vars: &EndpointVars) -> Result<String, FetchError> {
    let mut url = template.to_string();
    for (placeholder, value) in [
        ("{profileId}", vars.profile_id.as_deref()),
        ("{profileUrnId}", vars.profile_urn_id.as_deref()),
    ] {
        if url.contains(placeholder) {
            let value = value.ok_or(FetchError::UnresolvedPlaceholder(placeholder))?;
            url = url.replace(placeholder, value);
        }
    }
    Ok(url
        .replace("{start}", &vars.start.to_string())
        .replace("{count}", &vars.count.to_string()))
}

#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    /// Fetches one normalized response. An empty-but-valid response is `Ok`.
    async fn fetch(
        &self,
        endpoint_template: &str,
        vars: &EndpointVars,
        locale: Option<&str>,
    ) -> Result<NormalizedResponse, FetchError>;
}

/// `JSESSIONID` from a cookie header, quotes stripped. The API expects it echoed as the CSRF token.
pub fn csrf_from_cookie(cookie: &str) -> Option<String> {
    cookie
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == "JSESSIONID")
        .map(|(_, value)| value.replace('"', ""))
        .filter(|token| !token.is_empty())
}

#[derive(Clone)]
pub struct VoyagerClient {
    client: Client,
    base_url: String,
    csrf_token: Option<String>,
    cookie: Option<String>,
}

impl VoyagerClient {
    pub fn new(
        base_url: impl Into<String>,
        csrf_token: Option<String>,
        cookie: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let csrf_token = csrf_token.or_else(|| cookie.as_deref().and_then(csrf_from_cookie));
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            csrf_token,
            cookie,
        })
    }

    pub fn has_session(&self) -> bool {
        self.csrf_token.is_some()
    }

    fn absolute(&self, path: &str) -> String {
        if path.starts_with("https://") || path.starts_with("http://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl ProfileFetcher for VoyagerClient {
    /// Retries on 429 and 5xx with exponential backoff; other statuses fail immediately.
    async fn fetch(
        &self,
        endpoint_template: &str,
        vars: &EndpointVars,
        locale: Option<&str>,
    ) -> Result<NormalizedResponse, FetchError> {
        let csrf = self.csrf_token.as_deref().ok_or(FetchError::MissingSession)?;
        let url = self.absolute(&expand_endpoint(endpoint_template, vars)?);

        let mut last_error: Option<FetchError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "fetch attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let mut request = self
                .client
                .get(&url)
                .header("accept", NORMALIZED_ACCEPT)
                .header("csrf-token", csrf)
                .header("x-restli-protocol-version", RESTLI_PROTOCOL_VERSION);
            if let Some(cookie) = &self.cookie {
                request = request.header("cookie", cookie);
            }
            if let Some(locale) = locale {
                request = request.header("x-li-lang", locale);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(FetchError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("profile API returned {}: {}", status, body);
                last_error = Some(FetchError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(FetchError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let body = response.text().await?;
            let parsed: NormalizedResponse = serde_json::from_str(&body)?;
            debug!(url = %url, included = parsed.included.len(), "fetch succeeded");
            return Ok(parsed);
        }

        Err(last_error.unwrap_or(FetchError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}
