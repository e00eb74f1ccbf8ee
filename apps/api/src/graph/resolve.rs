//! Key resolution rules layered on [`EntityGraph`].
//!
//! A table-of-contents value can be:
//! - an array of URNs (used directly as the index list),
//! - a single URN (resolved; if the target is a collection its element list is used,
//!   otherwise the target itself is the result),
//! - an inline collection object carrying `*elements` / `elements`,
//! - absent (empty result).

use serde_json::Value;

use crate::graph::entity::{collection_urns, urn_list, Entity, Paging};
use crate::graph::store::EntityGraph;

impl EntityGraph {
    /// 1:1 lookup: the first key whose ToC value is a URN that resolves.
    pub fn get_value_by_key(&self, keys: &[&str]) -> Option<&Entity> {
        keys.iter().find_map(|key| {
            self.toc_value(key)
                .and_then(Value::as_str)
                .and_then(|urn| self.get_element_by_urn(urn))
        })
    }

    /// N-ary lookup. Multiple keys are resolved independently and concatenated
    /// without de-duplication.
    pub fn get_values_by_key(&self, keys: &[&str]) -> Vec<&Entity> {
        keys.iter()
            .flat_map(|key| match self.toc_value(key) {
                Some(value) => self.resolve_pointer(value),
                None => Vec::new(),
            })
            .collect()
    }

    /// Like [`EntityGraph::get_values_by_key`], but the raw ToC value is passed
    /// through `transform` before resolution. Absent values are not transformed.
    pub fn get_values_by_key_with<F>(&self, keys: &[&str], transform: F) -> Vec<&Entity>
    where
        F: Fn(&Value) -> Value,
    {
        keys.iter()
            .flat_map(|key| match self.toc_value(key) {
                Some(value) => self.resolve_pointer(&transform(value)),
                None => Vec::new(),
            })
            .collect()
    }

    /// Resolves a pointer field carried by any entity with the same rules as ToC keys.
    pub fn resolve_field(&self, entity: &Entity, field: &str) -> Vec<&Entity> {
        entity
            .get(field)
            .map(|value| self.resolve_pointer(value))
            .unwrap_or_default()
    }

    /// Resolves a raw pointer value to the entities it designates.
    pub fn resolve_pointer(&self, value: &Value) -> Vec<&Entity> {
        match value {
            Value::Array(items) => self.get_elements_by_urns(urn_list(items)),
            Value::String(urn) => match self.get_element_by_urn(urn) {
                Some(target) => match target.collection_urns() {
                    Some(urns) => self.get_elements_by_urns(urns),
                    None => vec![target],
                },
                None => Vec::new(),
            },
            Value::Object(record) => collection_urns(record)
                .map(|urns| self.get_elements_by_urns(urns))
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Paging metadata across every key that carries any, whether it sits on a
    /// resolved view entity or on an inline collection object. Any incomplete
    /// collection makes the result incomplete.
    pub fn paging_for_keys(&self, keys: &[&str]) -> Option<Paging> {
        Paging::combined(
            keys.iter()
                .filter_map(|key| self.toc_value(key))
                .filter_map(|value| self.paging_of_pointer(value)),
        )
    }

    /// Paging of the collection a pointer field on `entity` designates.
    pub fn paging_for_field(&self, entity: &Entity, field: &str) -> Option<Paging> {
        entity.get(field).and_then(|value| self.paging_of_pointer(value))
    }

    fn paging_of_pointer(&self, value: &Value) -> Option<Paging> {
        match value {
            Value::String(urn) => self.get_element_by_urn(urn)?.paging(),
            Value::Object(record) => record
                .get("paging")
                .and_then(|p| serde_json::from_value(p.clone()).ok()),
            _ => None,
        }
    }
}
