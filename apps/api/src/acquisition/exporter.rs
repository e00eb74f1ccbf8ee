//! Acquisition & cache orchestrator for one profile page.
//!
//! Decides where the raw response comes from (embedded payload or live fetch),
//! when the pipeline re-runs, and fills in incomplete sections through their
//! paginated endpoints. Parse results are cached per (page, locale).

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::acquisition::embedded::{
    select_profile_payload, EmbeddedPayloadSource, LazyLoadTrigger, MarkupPayloadSource,
    SettleDelay,
};
use crate::acquisition::fetcher::{endpoints, EndpointVars, ProfileFetcher};
use crate::acquisition::paginate::{fetch_all_pages, PaginationOutcome, PaginationPolicy};
use crate::errors::ExportError;
use crate::export::vcard::build_vcard;
use crate::graph::NormalizedResponse;
use crate::normalize::localize_response;
use crate::profile::{
    apply_section_page, parse_profile_response, response_default_locale, AcquisitionMethod,
    ProfileParseSummary,
};
use crate::resume::{ResumeDocuments, SchemaVersion};
use crate::sections::basics::{apply_contact_info, profile_url, ContactInfo};
use crate::sections::{CaptureResult, ParseContext, Section};

static PROFILE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"linkedin\.com/in/([^/?#\s]+)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseState {
    Unparsed,
    Parsing,
    Parsed,
}

/// The page being exported: its URL and the public profile id inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageIdentity {
    pub url: String,
    pub profile_id: String,
}

impl PageIdentity {
    pub fn parse(page_url: &str) -> Result<Self, ExportError> {
        let profile_id = PROFILE_PATH
            .captures(page_url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                ExportError::InvalidPage(format!("'{page_url}' is not a profile page URL"))
            })?;
        Ok(Self {
            url: page_url.to_string(),
            profile_id,
        })
    }

    pub fn for_profile(profile_id: &str) -> Self {
        Self {
            url: profile_url(profile_id),
            profile_id: profile_id.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExporterSettings {
    pub prefer_embedded: bool,
    pub pagination: PaginationPolicy,
    pub settle_delay: Duration,
}

impl Default for ExporterSettings {
    fn default() -> Self {
        Self {
            prefer_embedded: true,
            pagination: PaginationPolicy::default(),
            settle_delay: Duration::from_millis(400),
        }
    }
}

struct CachedParse {
    locale: Option<String>,
    summary: ProfileParseSummary,
    ctx: ParseContext,
    contact: Option<ContactInfo>,
}

pub struct ProfileExporter {
    fetcher: Arc<dyn ProfileFetcher>,
    embedded: Option<Arc<dyn EmbeddedPayloadSource>>,
    /// Set when `embedded` was built from captured markup.
    page_markup: Option<Arc<MarkupPayloadSource>>,
    lazy_load: Arc<dyn LazyLoadTrigger>,
    settings: ExporterSettings,
    page: PageIdentity,
    /// Locale the profile owner writes in, learned from the last acquired response.
    default_locale: Option<String>,
    state: ParseState,
    cache: Option<CachedParse>,
}

impl ProfileExporter {
    pub fn new(
        fetcher: Arc<dyn ProfileFetcher>,
        page: PageIdentity,
        settings: ExporterSettings,
    ) -> Self {
        Self {
            fetcher,
            embedded: None,
            page_markup: None,
            lazy_load: Arc::new(SettleDelay::new(settings.settle_delay)),
            settings,
            page,
            default_locale: None,
            state: ParseState::Unparsed,
            cache: None,
        }
    }

    pub fn page(&self) -> &PageIdentity {
        &self.page
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Swaps in the payload source for the current page. Cached results for
    /// the page stay valid only if the source was absent before.
    pub fn replace_embedded_source(&mut self, source: Option<Arc<dyn EmbeddedPayloadSource>>) {
        if self.embedded.is_some() {
            self.invalidate();
        }
        self.embedded = source;
        self.page_markup = None;
    }

    /// Reads embedded payloads from captured page markup. Markup identical to
    /// the current source is ignored unless `force` is set, so the cached parse
    /// survives repeated submissions of the same page. Returns whether the
    /// source was replaced.
    pub fn use_page_markup(&mut self, markup: String, force: bool) -> bool {
        let unchanged = self
            .page_markup
            .as_ref()
            .is_some_and(|current| current.markup() == markup);
        if unchanged && !force {
            debug!(page = %self.page.url, "page markup unchanged, keeping source");
            return false;
        }
        let source = Arc::new(MarkupPayloadSource::new(markup));
        self.replace_embedded_source(Some(source.clone()));
        self.page_markup = Some(source);
        true
    }

    /// Points the exporter at another page. A different page drops the cache
    /// and the embedded source, which belonged to the old page's markup.
    pub fn navigate(&mut self, page_url: &str) -> Result<(), ExportError> {
        let page = PageIdentity::parse(page_url)?;
        if !page.profile_id.eq_ignore_ascii_case(&self.page.profile_id) {
            info!(from = %self.page.url, to = %page.url, "page changed, dropping cached parse");
            self.page = page;
            self.default_locale = None;
            self.embedded = None;
            self.page_markup = None;
            self.lazy_load = Arc::new(SettleDelay::new(self.settings.settle_delay));
            self.invalidate();
        }
        Ok(())
    }

    fn invalidate(&mut self) {
        self.cache = None;
        self.state = ParseState::Unparsed;
    }

    /// Parses the current page, or returns the cached result when neither the
    /// page nor the locale changed since the last successful acquisition.
    pub async fn try_parse(&mut self, locale: Option<&str>) -> ProfileParseSummary {
        if let Some(cached) = &self.cache {
            if self.state == ParseState::Parsed && cached.locale.as_deref() == locale {
                debug!(page = %self.page.url, ?locale, "parse cache hit");
                return cached.summary.clone();
            }
        }

        self.state = ParseState::Parsing;
        self.lazy_load.ensure_loaded().await;

        let (method, mut response) = match self.acquire(locale).await {
            Ok(acquired) => acquired,
            Err(e) => {
                warn!(page = %self.page.url, error = %e, "profile acquisition failed");
                let method = if self.embedded_first(locale) {
                    AcquisitionMethod::Embedded
                } else {
                    AcquisitionMethod::LiveFetch
                };
                self.invalidate();
                return ProfileParseSummary::acquisition_failed(
                    method,
                    Some(self.page.url.clone()),
                    &e,
                );
            }
        };

        let response_locale = response_default_locale(&response);
        if let Some(desired) = locale {
            if response_locale.as_deref() != Some(desired) {
                debug!(locale = desired, "remapping locale-wrapped fields");
                localize_response(&mut response, desired);
            }
        }
        if response_locale.is_some() {
            self.default_locale = response_locale;
        }

        let mut ctx = ParseContext::new(
            ResumeDocuments::default(),
            Some(self.page.profile_id.clone()),
        );
        let mut summary = parse_profile_response(
            Arc::new(response),
            method,
            Some(self.page.url.clone()),
            &mut ctx,
        );

        let mut contact = None;
        if summary.succeeded {
            contact = self.load_contact_info(&mut ctx, locale).await;
            self.complete_incomplete_sections(&mut ctx, &mut summary, locale)
                .await;
            summary.warnings = ctx.warnings.clone();
        }

        self.cache = Some(CachedParse {
            locale: locale.map(str::to_string),
            summary: summary.clone(),
            ctx,
            contact,
        });
        self.state = ParseState::Parsed;
        summary
    }

    pub async fn force_reparse(&mut self, locale: Option<&str>) -> ProfileParseSummary {
        self.invalidate();
        self.try_parse(locale).await
    }

    /// The page payload is in the owner's own locale, so it goes first only
    /// when that locale is the one requested. An unknown owner locale counts
    /// as a mismatch for any explicit request.
    fn embedded_first(&self, locale: Option<&str>) -> bool {
        let locale_matches = match locale {
            None => true,
            Some(wanted) => self.default_locale.as_deref() == Some(wanted),
        };
        self.settings.prefer_embedded && self.embedded.is_some() && locale_matches
    }

    /// Tries both strategies in preference order; the first usable response wins.
    async fn acquire(
        &self,
        locale: Option<&str>,
    ) -> Result<(AcquisitionMethod, NormalizedResponse), ExportError> {
        let order = if self.embedded_first(locale) {
            [AcquisitionMethod::Embedded, AcquisitionMethod::LiveFetch]
        } else {
            [AcquisitionMethod::LiveFetch, AcquisitionMethod::Embedded]
        };

        let mut reasons = Vec::new();
        for method in order {
            let attempt = match method {
                AcquisitionMethod::Embedded => self.read_embedded().await,
                _ => self.fetch_live(locale).await,
            };
            match attempt {
                Ok(Some(response)) => {
                    info!(page = %self.page.url, ?method, "profile acquired");
                    return Ok((method, response));
                }
                Ok(None) => reasons.push(format!("{method:?}: no matching profile data")),
                Err(e) => reasons.push(format!("{method:?}: {e}")),
            }
        }
        Err(ExportError::AcquisitionFailure(reasons.join("; ")))
    }

    async fn read_embedded(&self) -> Result<Option<NormalizedResponse>, ExportError> {
        let Some(source) = &self.embedded else {
            return Ok(None);
        };
        let payloads = source.read_payloads().await?;
        debug!(blobs = payloads.len(), "embedded payloads read");
        Ok(select_profile_payload(payloads, Some(self.page.profile_id.as_str())))
    }

    /// Profile view first, the dash full profile if that fails or comes back empty.
    async fn fetch_live(&self, locale: Option<&str>) -> Result<Option<NormalizedResponse>, ExportError> {
        let vars = EndpointVars::for_profile(self.page.profile_id.clone());
        let mut last_error = None;
        for endpoint in [endpoints::PROFILE_VIEW, endpoints::DASH_FULL_PROFILE] {
            match self.fetcher.fetch(endpoint, &vars, locale).await {
                Ok(response) if !response.is_empty() => return Ok(Some(response)),
                Ok(_) => debug!(endpoint, "empty profile response"),
                Err(e) => {
                    warn!(endpoint, error = %e, "profile fetch failed");
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) => Err(e.into()),
            None => Ok(None),
        }
    }

    async fn load_contact_info(
        &self,
        ctx: &mut ParseContext,
        locale: Option<&str>,
    ) -> Option<ContactInfo> {
        let vars = EndpointVars::for_profile(self.page.profile_id.clone());
        match self.fetcher.fetch(endpoints::CONTACT_INFO, &vars, locale).await {
            Ok(response) => {
                let info = ContactInfo::from_response(&response);
                apply_contact_info(&mut ctx.documents, &info);
                Some(info)
            }
            Err(e) => {
                warn!(error = %e, "contact info unavailable");
                ctx.warnings.push(format!("contact info unavailable: {e}"));
                None
            }
        }
    }

    /// Re-fetches every incomplete section through its paginated endpoint.
    /// A section's entries are only replaced once a first page has arrived.
    /// Warnings go to `ctx`; the caller copies them into the summary.
    async fn complete_incomplete_sections(
        &self,
        ctx: &mut ParseContext,
        summary: &mut ProfileParseSummary,
        locale: Option<&str>,
    ) {
        for section in Section::PARSE_ORDER {
            if summary.section(section) != CaptureResult::Incomplete {
                continue;
            }
            let Some(endpoint) = endpoints::section_endpoint(section) else {
                continue;
            };
            let vars = EndpointVars {
                profile_id: ctx.profile_id.clone(),
                profile_urn_id: ctx.profile_urn_id.clone(),
                ..EndpointVars::default()
            };

            let paged = match fetch_all_pages(
                self.fetcher.as_ref(),
                section,
                endpoint,
                &vars,
                locale,
                &self.settings.pagination,
            )
            .await
            {
                Ok(paged) => paged,
                Err(e) => {
                    warn!(%section, error = %e, "section stays incomplete");
                    ctx.warnings.push(e.to_string());
                    continue;
                }
            };

            ctx.documents.clear_section(section);
            let mut captured_any = false;
            for page in &paged.pages {
                match apply_section_page(section, page, ctx) {
                    Ok(CaptureResult::Success | CaptureResult::Incomplete) => captured_any = true,
                    Ok(_) => {}
                    Err(e) => {
                        warn!(%section, error = %e, "page could not be mapped");
                        ctx.warnings.push(e.to_string());
                    }
                }
            }

            let result = match paged.outcome {
                PaginationOutcome::Complete if captured_any => CaptureResult::Success,
                PaginationOutcome::Complete => CaptureResult::Empty,
                PaginationOutcome::CeilingReached | PaginationOutcome::BailedOut => {
                    CaptureResult::Incomplete
                }
            };
            info!(%section, requests = paged.requests, ?result, "section pagination finished");
            summary.sections.insert(section, result);
        }
    }

    /// The parsed document, or the empty template when nothing has been parsed.
    pub fn output_document(&self, version: SchemaVersion) -> Result<Value, ExportError> {
        let document = match &self.cache {
            Some(cached) if cached.summary.succeeded => cached.ctx.documents.document(version)?,
            _ => ResumeDocuments::default().document(version)?,
        };
        Ok(document)
    }

    pub fn supported_locales(&self) -> Vec<String> {
        self.cache
            .as_ref()
            .map(|cached| cached.ctx.supported_locales.clone())
            .unwrap_or_default()
    }

    pub fn summary(&self) -> Option<&ProfileParseSummary> {
        self.cache.as_ref().map(|cached| &cached.summary)
    }

    /// vCard for the parsed profile, parsing first when needed.
    pub async fn generate_vcard(&mut self) -> Result<String, ExportError> {
        if self.cache.is_none() {
            self.try_parse(None).await;
        }
        match &self.cache {
            Some(cached) if cached.summary.succeeded => {
                Ok(build_vcard(&cached.ctx, cached.contact.as_ref()))
            }
            Some(cached) => Err(ExportError::AcquisitionFailure(
                cached
                    .summary
                    .failure
                    .clone()
                    .unwrap_or_else(|| "profile could not be parsed".to_string()),
            )),
            None => Err(ExportError::AcquisitionFailure(
                "no usable profile data".to_string(),
            )),
        }
    }
}
