use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Uniform Resource Name: the unique id of one entity within a response.
pub type Urn = String;

/// Field names under which a collection carries its ordered URN list.
/// Both spellings occur in the wild.
pub const ELEMENTS_KEYS: [&str; 2] = ["*elements", "elements"];

/// One record of a normalized response.
///
/// Only the identity fields are typed; everything else stays in the open
/// `fields` bag because the shape varies per endpoint and API generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    #[serde(rename = "$type", default, skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,
    #[serde(rename = "entityUrn", default, skip_serializing_if = "Option::is_none")]
    pub entity_urn: Option<Urn>,
    #[serde(rename = "objectUrn", default, skip_serializing_if = "Option::is_none")]
    pub object_urn: Option<Urn>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Pagination metadata attached to views and collections.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Paging {
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub total: Option<u64>,
}

impl Paging {
    /// A page is incomplete when `start + count < total`. Unknown totals count as complete.
    pub fn is_incomplete(&self) -> bool {
        self.total
            .is_some_and(|total| self.start.saturating_add(self.count) < total)
    }

    /// One verdict for a section fed by several collections: the first
    /// incomplete paging if any, otherwise the first one seen.
    pub fn combined(pagings: impl IntoIterator<Item = Paging>) -> Option<Paging> {
        let mut first = None;
        for paging in pagings {
            if paging.is_incomplete() {
                return Some(paging);
            }
            first.get_or_insert(paging);
        }
        first
    }
}

/// Raw payload: a table of contents plus a flat pool of entities.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NormalizedResponse {
    #[serde(default)]
    pub data: Entity,
    #[serde(default)]
    pub included: Vec<Entity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl NormalizedResponse {
    pub fn is_empty(&self) -> bool {
        self.included.is_empty() && self.data.fields.is_empty()
    }
}

impl Entity {
    /// The lookup key: `entityUrn`, falling back to `objectUrn`.
    pub fn key(&self) -> Option<&str> {
        self.entity_urn
            .as_deref()
            .or(self.object_urn.as_deref())
    }

    /// Field value, treating an explicit JSON `null` as absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    /// First non-empty string found under any of the alternate field names.
    pub fn str_field(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.get(name).and_then(Value::as_str))
            .find(|s| !s.is_empty())
    }

    /// Owned copy of [`Entity::str_field`], for record construction.
    pub fn string(&self, names: &[&str]) -> Option<String> {
        self.str_field(names).map(str::to_string)
    }

    /// First value present under any of the alternate field names.
    pub fn any_field(&self, names: &[&str]) -> Option<&Value> {
        names.iter().find_map(|name| self.get(name))
    }

    pub fn is_type(&self, types: &[&str]) -> bool {
        self.type_tag
            .as_deref()
            .is_some_and(|t| types.contains(&t))
    }

    /// The ordered URN list carried by a collection entity, if this is one.
    pub fn collection_urns(&self) -> Option<Vec<Urn>> {
        collection_urns(&self.fields)
    }

    pub fn paging(&self) -> Option<Paging> {
        self.get("paging")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Reads `*elements` / `elements` off a record, when it holds a URN array.
pub fn collection_urns(record: &Map<String, Value>) -> Option<Vec<Urn>> {
    ELEMENTS_KEYS
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_array))
        .map(|items| urn_list(items))
}

/// Collects the string members of a JSON array, skipping anything else.
pub fn urn_list(items: &[Value]) -> Vec<Urn> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}
