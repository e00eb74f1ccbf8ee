use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::debug;

use crate::graph::entity::{collection_urns, Entity, NormalizedResponse, Urn};

/// Random-access index over one normalized response.
///
/// `entities` follows the table of contents' ordering hint when one exists;
/// entities the hint does not mention keep their source order after it.
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    table_of_contents: Entity,
    entities: Vec<Entity>,
    index_by_urn: HashMap<Urn, usize>,
}

impl EntityGraph {
    pub fn build(response: &NormalizedResponse) -> Self {
        Self::from_parts(response.data.clone(), response.included.clone())
    }

    /// Builds the store from a root record and an entity pool.
    pub fn from_parts(mut table_of_contents: Entity, included: Vec<Entity>) -> Self {
        table_of_contents.fields.remove("included");

        let entities = match collection_urns(&table_of_contents.fields) {
            Some(hint) if !hint.is_empty() => order_by_hint(included, &hint),
            _ => included,
        };

        let mut index_by_urn = HashMap::with_capacity(entities.len());
        for (position, entity) in entities.iter().enumerate() {
            if let Some(key) = entity.key() {
                if index_by_urn.insert(key.to_string(), position).is_some() {
                    debug!(urn = key, "duplicate entity urn, later entity wins");
                }
            }
        }

        Self {
            table_of_contents,
            entities,
            index_by_urn,
        }
    }

    pub fn table_of_contents(&self) -> &Entity {
        &self.table_of_contents
    }

    /// Raw table-of-contents value for a key.
    pub fn toc_value(&self, key: &str) -> Option<&Value> {
        self.table_of_contents.get(key)
    }

    /// All entities, in resolved display order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.index_by_urn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get_element_by_urn(&self, urn: &str) -> Option<&Entity> {
        self.index_by_urn.get(urn).map(|&i| &self.entities[i])
    }

    /// Dereferences each URN in order, silently skipping unknown ones.
    /// A single URN can be passed as a one-element slice or `Some(urn)`.
    pub fn get_elements_by_urns<I, S>(&self, urns: I) -> Vec<&Entity>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        urns.into_iter()
            .filter_map(|urn| self.get_element_by_urn(urn.as_ref()))
            .collect()
    }

    /// Full scan for entities tagged with any of `types`.
    ///
    /// Makes no promise about display order: the result reflects pool order,
    /// which the source API does not keep stable.
    pub fn get_elements_by_type(&self, types: &[&str]) -> Vec<&Entity> {
        self.entities.iter().filter(|e| e.is_type(types)).collect()
    }

    /// The root ordering hint, or empty.
    pub fn get_element_keys(&self) -> Vec<Urn> {
        collection_urns(&self.table_of_contents.fields).unwrap_or_default()
    }

    pub fn get_elements(&self) -> Vec<&Entity> {
        self.get_elements_by_urns(self.get_element_keys())
    }
}

fn order_by_hint(included: Vec<Entity>, hint: &[Urn]) -> Vec<Entity> {
    let mut slots: Vec<Option<Entity>> = included.into_iter().map(Some).collect();
    let mut first_position: HashMap<&str, usize> = HashMap::new();
    for (position, slot) in slots.iter().enumerate() {
        if let Some(key) = slot.as_ref().and_then(Entity::key) {
            first_position.entry(key).or_insert(position);
        }
    }
    let first_position: HashMap<String, usize> = first_position
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

    let mut ordered = Vec::with_capacity(slots.len());
    let mut seen = HashSet::new();
    for urn in hint {
        if !seen.insert(urn.as_str()) {
            continue;
        }
        if let Some(entity) = first_position.get(urn).and_then(|&i| slots[i].take()) {
            ordered.push(entity);
        }
    }
    ordered.extend(slots.into_iter().flatten());
    ordered
}
