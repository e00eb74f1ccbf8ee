//! Basics: identity, headline, location and picture from the profile entity,
//! plus the contact-info overlay fetched separately.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::ExportError;
use crate::graph::{Entity, EntityGraph, NormalizedResponse};
use crate::normalize::locale_tag;
use crate::resume::common::Profile;
use crate::resume::records::BasicsPatch;
use crate::resume::ResumeDocuments;
use crate::sections::keys::{MINI_PROFILE_KEY, PROFILE};
use crate::sections::{CaptureResult, ParseContext, Section};

const VECTOR_IMAGE_WRAPPER: &str = "com.linkedin.common.VectorImage";

pub fn profile_url(public_id: &str) -> String {
    format!("https://www.linkedin.com/in/{public_id}/")
}

/// The profile entity, through the ToC pointer or, failing that, by type.
pub fn find_profile(graph: &EntityGraph) -> Option<&Entity> {
    graph
        .get_value_by_key(PROFILE.toc_keys)
        .or_else(|| graph.get_elements_by_type(PROFILE.types).into_iter().next())
}

pub fn map_basics(graph: &EntityGraph, ctx: &mut ParseContext) -> Result<CaptureResult, ExportError> {
    let profile = find_profile(graph).ok_or_else(|| ExportError::SectionMappingFault {
        section: Section::Basics,
        reason: "response carries no profile entity".to_string(),
    })?;

    let first_name = profile.string(&["firstName"]);
    let last_name = profile.string(&["lastName"]);
    let full_name = [first_name.as_deref(), last_name.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    let basic_location = profile
        .any_field(&["location"])
        .and_then(|loc| loc.get("basicLocation"));
    let nested_str = |value: Option<&Value>, field: &str| {
        value
            .and_then(|v| v.get(field))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let picture = graph
        .resolve_field(profile, MINI_PROFILE_KEY)
        .first()
        .and_then(|mini| mini.get("picture"))
        .and_then(vector_image_url)
        .or_else(|| profile_picture_url(profile));

    ctx.documents.push(BasicsPatch {
        name: (!full_name.is_empty()).then_some(full_name),
        label: profile.string(&["headline"]),
        picture,
        summary: profile.string(&["summary"]),
        address: profile.string(&["address", "locationName", "geoLocationName"]),
        postal_code: nested_str(basic_location, "postalCode"),
        country_code: nested_str(basic_location, "countryCode")
            .or_else(|| nested_str(profile.get("defaultLocale"), "country")),
        ..BasicsPatch::default()
    });

    if let Some(public_id) = profile.string(&["publicIdentifier"]) {
        ctx.profile_id.get_or_insert(public_id);
    }
    if let Some(public_id) = ctx.profile_id.clone() {
        if !ctx.documents.has_profile_network("LinkedIn") {
            ctx.documents.push_profile(Profile {
                network: "LinkedIn".to_string(),
                url: profile_url(&public_id),
                username: public_id,
            });
        }
    }

    if let Some(urn) = profile.key() {
        ctx.profile_urn_id = urn.rsplit(':').next().map(str::to_string);
    }
    ctx.first_name = first_name;
    ctx.last_name = last_name;

    if let Some(tag) = profile
        .any_field(&["primaryLocale", "defaultLocale"])
        .and_then(locale_tag)
    {
        debug!(locale = %tag, "observed profile locale");
        ctx.locale_tag = Some(tag);
    }
    if let Some(Value::Array(locales)) = profile.get("supportedLocales") {
        ctx.supported_locales = locales.iter().filter_map(locale_tag).collect();
    }

    Ok(CaptureResult::Success)
}

/// `rootUrl` plus the path segment of the widest artifact.
pub fn vector_image_url(image: &Value) -> Option<String> {
    let image = image.get(VECTOR_IMAGE_WRAPPER).unwrap_or(image);
    let root = image.get("rootUrl").and_then(Value::as_str)?;
    let largest = image
        .get("artifacts")
        .and_then(Value::as_array)?
        .iter()
        .max_by_key(|artifact| artifact.get("width").and_then(Value::as_u64).unwrap_or(0))?;
    let segment = largest
        .get("fileIdentifyingUrlPathSegment")
        .and_then(Value::as_str)?;
    Some(format!("{root}{segment}"))
}

fn profile_picture_url(profile: &Entity) -> Option<String> {
    let reference = profile.get("profilePicture")?;
    ["displayImageReference", "displayImageReferenceResolutionResult"]
        .iter()
        .find_map(|field| reference.get(*field)?.get("vectorImage"))
        .and_then(vector_image_url)
}

// ──────────────────────────────────────────────
// Contact info
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumber {
    #[serde(default)]
    pub number: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebsiteCategory {
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Website {
    #[serde(default)]
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: Option<WebsiteCategory>,
}

/// The separately fetched contact-info record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub phone_numbers: Option<Vec<PhoneNumber>>,
    #[serde(default)]
    pub websites: Option<Vec<Website>>,
    #[serde(default)]
    pub twitter_handles: Option<Vec<Value>>,
    #[serde(default)]
    pub address: Option<String>,
}

impl ContactInfo {
    /// Reads the record off the response root; unknown shapes yield an empty record.
    pub fn from_response(response: &NormalizedResponse) -> Self {
        let fields = Value::Object(response.data.fields.clone());
        match serde_json::from_value(fields) {
            Ok(info) => info,
            Err(e) => {
                debug!("contact info response not understood: {e}");
                Self::default()
            }
        }
    }

    pub fn first_phone(&self) -> Option<&PhoneNumber> {
        self.phone_numbers
            .as_deref()
            .and_then(|numbers| numbers.iter().find(|n| !n.number.is_empty()))
    }

    /// Handles arrive either as bare strings or as `{ name }` records.
    pub fn twitter_usernames(&self) -> Vec<String> {
        self.twitter_handles
            .iter()
            .flatten()
            .filter_map(|handle| handle.as_str().or_else(|| handle.get("name")?.as_str()))
            .map(|name| name.trim().trim_start_matches('@').to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }

    pub fn portfolio_website(&self) -> Option<&str> {
        self.websites.as_deref().and_then(|sites| {
            sites
                .iter()
                .find(|site| {
                    site.kind
                        .as_ref()
                        .and_then(|k| k.category.as_deref())
                        .is_some_and(|c| c.to_ascii_lowercase().contains("portfolio"))
                })
                .map(|site| site.url.as_str())
        })
    }
}

/// Copies contact details onto basics. Values already absent from the record leave basics untouched.
pub fn apply_contact_info(documents: &mut ResumeDocuments, info: &ContactInfo) {
    let non_empty = |s: &Option<String>| s.clone().filter(|v| !v.trim().is_empty());
    documents.push(BasicsPatch {
        email: non_empty(&info.email_address),
        phone: info.first_phone().map(|p| p.number.clone()),
        address: non_empty(&info.address),
        website: info.portfolio_website().map(str::to_string),
        ..BasicsPatch::default()
    });

    if let Some(username) = info.twitter_usernames().into_iter().next() {
        if !documents.has_profile_network("Twitter") {
            documents.push_profile(Profile {
                network: "Twitter".to_string(),
                url: format!("https://twitter.com/{username}"),
                username,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::test_support::graph;
    use serde_json::json;

    fn profile_graph() -> EntityGraph {
        graph(json!({
            "data": { "*profile": "urn:li:fs_profile:ACoAAA1" },
            "included": [
                {
                    "$type": "com.linkedin.voyager.identity.profile.Profile",
                    "entityUrn": "urn:li:fs_profile:ACoAAA1",
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "headline": "Analyst",
                    "summary": "Notes on the engine",
                    "locationName": "London",
                    "location": { "basicLocation": { "countryCode": "gb", "postalCode": "W1" } },
                    "defaultLocale": { "language": "en", "country": "US" },
                    "supportedLocales": [
                        { "language": "en", "country": "US" },
                        { "language": "fr", "country": "FR" }
                    ],
                    "publicIdentifier": "ada",
                    "*miniProfile": "urn:li:fs_miniProfile:ACoAAA1"
                },
                {
                    "entityUrn": "urn:li:fs_miniProfile:ACoAAA1",
                    "picture": {
                        "com.linkedin.common.VectorImage": {
                            "rootUrl": "https://media/",
                            "artifacts": [
                                { "width": 100, "fileIdentifyingUrlPathSegment": "small.jpg" },
                                { "width": 800, "fileIdentifyingUrlPathSegment": "large.jpg" },
                                { "width": 400, "fileIdentifyingUrlPathSegment": "mid.jpg" }
                            ]
                        }
                    }
                }
            ]
        }))
    }

    #[test]
    fn test_map_basics_fills_identity_fields() {
        let g = profile_graph();
        let mut ctx = ParseContext::default();
        assert_eq!(map_basics(&g, &mut ctx).unwrap(), CaptureResult::Success);

        let basics = &ctx.documents.stable.basics;
        assert_eq!(basics.name, "Ada Lovelace");
        assert_eq!(basics.label, "Analyst");
        assert_eq!(basics.summary, "Notes on the engine");
        assert_eq!(basics.location.address, "London");
        assert_eq!(basics.location.country_code, "gb");
        assert_eq!(basics.location.postal_code, "W1");
        assert_eq!(basics.image, "https://media/large.jpg");
        assert_eq!(ctx.documents.legacy.basics.picture, "https://media/large.jpg");
        assert_eq!(basics.profiles[0].url, "https://www.linkedin.com/in/ada/");
    }

    #[test]
    fn test_map_basics_records_person_state() {
        let g = profile_graph();
        let mut ctx = ParseContext::default();
        map_basics(&g, &mut ctx).unwrap();
        assert_eq!(ctx.profile_id.as_deref(), Some("ada"));
        assert_eq!(ctx.profile_urn_id.as_deref(), Some("ACoAAA1"));
        assert_eq!(ctx.locale_tag.as_deref(), Some("en_US"));
        assert_eq!(ctx.supported_locales, vec!["en_US", "fr_FR"]);
    }

    #[test]
    fn test_linkedin_profile_added_once() {
        let g = profile_graph();
        let mut ctx = ParseContext::default();
        map_basics(&g, &mut ctx).unwrap();
        map_basics(&g, &mut ctx).unwrap();
        assert_eq!(ctx.documents.stable.basics.profiles.len(), 1);
    }

    #[test]
    fn test_missing_profile_is_a_mapping_fault() {
        let g = graph(json!({ "data": {}, "included": [] }));
        let mut ctx = ParseContext::default();
        let err = map_basics(&g, &mut ctx).unwrap_err();
        assert!(matches!(
            err,
            ExportError::SectionMappingFault { section: Section::Basics, .. }
        ));
    }

    #[test]
    fn test_profile_found_by_type_without_toc_key() {
        let g = graph(json!({
            "data": {},
            "included": [{
                "$type": "com.linkedin.voyager.dash.identity.profile.Profile",
                "entityUrn": "urn:li:fsd_profile:X",
                "firstName": "Grace"
            }]
        }));
        let mut ctx = ParseContext::default();
        map_basics(&g, &mut ctx).unwrap();
        assert_eq!(ctx.documents.stable.basics.name, "Grace");
    }

    #[test]
    fn test_apply_contact_info() {
        let mut docs = ResumeDocuments::default();
        let info: ContactInfo = serde_json::from_value(json!({
            "emailAddress": "ada@example.com",
            "phoneNumbers": [{ "number": "+44 1234", "type": "MOBILE" }],
            "websites": [
                { "url": "https://blog.example.com", "type": { "category": "BLOG" } },
                { "url": "https://ada.dev", "type": { "category": "PORTFOLIO" } }
            ],
            "twitterHandles": [{ "name": "@ada" }],
            "address": null
        }))
        .unwrap();
        apply_contact_info(&mut docs, &info);

        let basics = &docs.stable.basics;
        assert_eq!(basics.email, "ada@example.com");
        assert_eq!(basics.phone, "+44 1234");
        assert_eq!(basics.url, "https://ada.dev");
        assert_eq!(docs.legacy.basics.website, "https://ada.dev");
        assert_eq!(basics.profiles[0].network, "Twitter");
        assert_eq!(basics.profiles[0].username, "ada");
        assert!(basics.location.address.is_empty());
    }

    #[test]
    fn test_contact_info_from_response_root() {
        let resp: NormalizedResponse = serde_json::from_value(json!({
            "data": {
                "$type": "com.linkedin.voyager.identity.profile.ProfileContactInfo",
                "emailAddress": "x@y.z"
            },
            "included": []
        }))
        .unwrap();
        let info = ContactInfo::from_response(&resp);
        assert_eq!(info.email_address.as_deref(), Some("x@y.z"));
    }
}
