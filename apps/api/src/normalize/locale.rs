use serde_json::{Map, Value};

use crate::graph::{Entity, NormalizedResponse};

/// Prefix of fields holding a `{ locale_tag: value }` map, e.g. `multiLocaleFirstName`.
pub const MULTI_LOCALE_PREFIX: &str = "multiLocale";

/// Hoists locale-wrapped values onto their plain sibling fields, in place.
///
/// `multiLocaleFirstName: { en_US: "B" }` overwrites `firstName` with `"B"` when
/// `desired_locale` is `en_US`. Other nested records and lists are only walked
/// when `deep` is set.
pub fn remap_nested_locale(value: &mut Value, desired_locale: &str, deep: bool) {
    match value {
        Value::Array(items) => {
            for item in items {
                remap_nested_locale(item, desired_locale, deep);
            }
        }
        Value::Object(record) => remap_record(record, desired_locale, deep),
        _ => {}
    }
}

pub fn remap_entity_locale(entity: &mut Entity, desired_locale: &str, deep: bool) {
    remap_record(&mut entity.fields, desired_locale, deep);
}

/// Applies [`remap_entity_locale`] to the table of contents and every included entity.
pub fn localize_response(response: &mut NormalizedResponse, desired_locale: &str) {
    remap_entity_locale(&mut response.data, desired_locale, true);
    for entity in &mut response.included {
        remap_entity_locale(entity, desired_locale, true);
    }
}

fn remap_record(record: &mut Map<String, Value>, desired_locale: &str, deep: bool) {
    let mut hoisted = Vec::new();
    for (field, nested) in record.iter_mut() {
        if field.starts_with(MULTI_LOCALE_PREFIX) {
            if let Value::Object(locale_map) = nested {
                if let (Some(localized), Some(target)) =
                    (locale_map.get(desired_locale), unwrapped_field_name(field))
                {
                    hoisted.push((target, localized.clone()));
                }
            }
        } else if deep && (nested.is_object() || nested.is_array()) {
            remap_nested_locale(nested, desired_locale, deep);
        }
    }
    for (field, localized) in hoisted {
        record.insert(field, localized);
    }
}

/// `multiLocaleFirstName` → `firstName`.
fn unwrapped_field_name(field: &str) -> Option<String> {
    let rest = field.strip_prefix(MULTI_LOCALE_PREFIX)?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    Some(first.to_lowercase().chain(chars).collect())
}

/// `{ language: "en", country: "US" }` → `en_US`.
pub fn locale_tag(locale: &Value) -> Option<String> {
    let language = locale.get("language").and_then(Value::as_str)?;
    match locale.get("country").and_then(Value::as_str) {
        Some(country) if !country.is_empty() => Some(format!("{language}_{country}")),
        _ => Some(language.to_string()),
    }
}
