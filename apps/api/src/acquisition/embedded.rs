//! Embedded-payload acquisition: profile data the page already shipped inside
//! its markup, as HTML-escaped JSON in `<code id="bpr-guid-…">` blocks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::errors::ExportError;
use crate::graph::NormalizedResponse;
use crate::sections::keys::{MINI_PROFILE_KEY, PROFILE};

static PAYLOAD_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<code[^>]*\bid="bpr-guid-[^"]*"[^>]*>(.*?)</code>"#).unwrap()
});

#[async_trait]
pub trait EmbeddedPayloadSource: Send + Sync {
    /// Every JSON blob the page carries, parsed. Blobs that fail to parse are skipped.
    async fn read_payloads(&self) -> Result<Vec<Value>, ExportError>;
}

/// Reads payloads out of a captured copy of the page markup.
#[derive(Debug, Clone)]
pub struct MarkupPayloadSource {
    markup: String,
}

impl MarkupPayloadSource {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }
}

#[async_trait]
impl EmbeddedPayloadSource for MarkupPayloadSource {
    async fn read_payloads(&self) -> Result<Vec<Value>, ExportError> {
        Ok(extract_payloads(&self.markup))
    }
}

pub fn extract_payloads(markup: &str) -> Vec<Value> {
    PAYLOAD_BLOCK
        .captures_iter(markup)
        .filter_map(|caps| caps.get(1))
        .filter_map(|block| {
            let text = html_unescape(block.as_str().trim());
            match serde_json::from_str(&text) {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!("skipping unparsable embedded block: {e}");
                    None
                }
            }
        })
        .collect()
}

/// Decodes the named entities markup escaping produces, plus numeric references.
pub fn html_unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').and_then(|semi| {
            let decoded = match &rest[1..semi] {
                "quot" => Some('"'),
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "apos" => Some('\''),
                entity => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            decoded.map(|c| (c, semi + 1))
        });
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// True when the blob is a normalized response holding a profile entity, and
/// (if an id is given) that profile's public identifier matches it. Only the
/// profile itself, the entity `*profile` points at, and their mini profiles
/// are consulted; other people included in the payload never match.
pub fn payload_matches_profile(payload: &Value, profile_id: Option<&str>) -> bool {
    let Some(included) = payload.get("included").and_then(Value::as_array) else {
        return false;
    };
    let by_urn = |urn: &str| {
        included
            .iter()
            .find(|e| e.get("entityUrn").and_then(Value::as_str) == Some(urn))
    };
    let pointed = payload
        .pointer("/data/*profile")
        .and_then(Value::as_str)
        .and_then(by_urn);
    let profiles: Vec<&Value> = included
        .iter()
        .filter(|e| {
            e.get("$type")
                .and_then(Value::as_str)
                .is_some_and(|t| PROFILE.types.contains(&t))
        })
        .chain(pointed)
        .collect();
    if profiles.is_empty() {
        return false;
    }
    let Some(wanted) = profile_id else {
        return true;
    };
    let public_id_matches = |entity: &Value| {
        entity
            .get("publicIdentifier")
            .and_then(Value::as_str)
            .is_some_and(|id| id.eq_ignore_ascii_case(wanted))
    };
    profiles.into_iter().any(|profile| {
        public_id_matches(profile)
            || profile
                .get(MINI_PROFILE_KEY)
                .and_then(Value::as_str)
                .and_then(by_urn)
                .is_some_and(public_id_matches)
    })
}

/// The first payload that belongs to the profile, decoded.
pub fn select_profile_payload(payloads: Vec<Value>, profile_id: Option<&str>) -> Option<NormalizedResponse> {
    payloads
        .into_iter()
        .filter(|p| payload_matches_profile(p, profile_id))
        .find_map(|p| serde_json::from_value(p).ok())
}

/// Makes sure lazily-loaded page content is present before payloads are read.
#[async_trait]
pub trait LazyLoadTrigger: Send + Sync {
    /// Idempotent: only the first call does any work.
    async fn ensure_loaded(&self);
}

/// Waits a fixed settle period once, giving late payloads time to arrive.
#[derive(Debug)]
pub struct SettleDelay {
    delay: Duration,
    settled: AtomicBool,
}

impl SettleDelay {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            settled: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl LazyLoadTrigger for SettleDelay {
    async fn ensure_loaded(&self) {
        if !self.settled.swap(true, Ordering::SeqCst) {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn markup() -> String {
        let payload = json!({
            "data": { "*profile": "urn:li:fs_profile:A1" },
            "included": [{
                "$type": "com.linkedin.voyager.identity.profile.Profile",
                "entityUrn": "urn:li:fs_profile:A1",
                "publicIdentifier": "ada",
                "summary": "Tom & Jerry <3"
            }]
        })
        .to_string()
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;");
        format!(
            r#"<html><code id="datalet-bpr-guid-1">{{&quot;request&quot;:&quot;/x&quot;}}</code>
            <code style="display: none" id="bpr-guid-1">
                {payload}
            </code>
            <code id="bpr-guid-2">not json</code></html>"#
        )
    }

    #[test]
    fn test_html_unescape() {
        assert_eq!(html_unescape("&quot;a&quot; &amp; &lt;b&gt;"), "\"a\" & <b>");
        assert_eq!(html_unescape("&#39;&#x41;&#X42;"), "'AB");
        assert_eq!(html_unescape("fish & chips &bogus; end&"), "fish & chips &bogus; end&");
    }

    #[test]
    fn test_extract_payloads_skips_other_blocks() {
        let payloads = extract_payloads(&markup());
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0]["included"][0]["summary"], "Tom & Jerry <3");
    }

    #[test]
    fn test_payload_matching() {
        let payloads = extract_payloads(&markup());
        assert!(payload_matches_profile(&payloads[0], Some("ada")));
        assert!(payload_matches_profile(&payloads[0], Some("ADA")));
        assert!(payload_matches_profile(&payloads[0], None));
        assert!(!payload_matches_profile(&payloads[0], Some("grace")));
        assert!(!payload_matches_profile(&json!({ "included": [] }), None));
    }

    #[test]
    fn test_other_people_in_payload_do_not_match() {
        let payload = json!({
            "data": { "*profile": "urn:li:fs_profile:G1" },
            "included": [
                {
                    "$type": "com.linkedin.voyager.identity.profile.Profile",
                    "entityUrn": "urn:li:fs_profile:G1",
                    "publicIdentifier": "grace"
                },
                {
                    "$type": "com.linkedin.voyager.identity.shared.MiniProfile",
                    "entityUrn": "urn:li:fs_miniProfile:A1",
                    "publicIdentifier": "ada"
                }
            ]
        });
        assert!(payload_matches_profile(&payload, Some("grace")));
        assert!(!payload_matches_profile(&payload, Some("ada")));
    }

    #[test]
    fn test_public_id_on_linked_mini_profile() {
        let payload = json!({
            "data": { "*profile": "urn:li:fs_profile:A1" },
            "included": [
                {
                    "$type": "com.linkedin.voyager.identity.profile.Profile",
                    "entityUrn": "urn:li:fs_profile:A1",
                    "*miniProfile": "urn:li:fs_miniProfile:A1"
                },
                { "entityUrn": "urn:li:fs_miniProfile:A1", "publicIdentifier": "ada" }
            ]
        });
        assert!(payload_matches_profile(&payload, Some("ada")));
        assert!(!payload_matches_profile(&payload, Some("grace")));
    }

    #[tokio::test]
    async fn test_markup_source_and_selection() {
        let source = MarkupPayloadSource::new(markup());
        let payloads = source.read_payloads().await.unwrap();
        let response = select_profile_payload(payloads, Some("ada")).unwrap();
        assert_eq!(response.included.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_delay_waits_only_once() {
        let trigger = SettleDelay::new(Duration::from_millis(400));
        let started = tokio::time::Instant::now();
        trigger.ensure_loaded().await;
        assert!(started.elapsed() >= Duration::from_millis(400));
        let second = tokio::time::Instant::now();
        trigger.ensure_loaded().await;
        assert!(second.elapsed() < Duration::from_millis(1));
    }
}
