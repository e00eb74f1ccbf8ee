//! Multi-level "grouped" indirection.
//!
//! The source clusters some records (employment positions, most notably) into
//! intermediate group wrappers, and the physical encoding of that relationship
//! has changed between API generations. Resolution tries each known layout in
//! order and keeps the first one that yields anything.

use serde::Serialize;
use tracing::{debug, warn};

use crate::graph::entity::{Entity, Paging};
use crate::graph::store::EntityGraph;

/// Where to look for grouped records under each known layout.
#[derive(Debug, Clone, Copy)]
pub struct GroupConfig {
    /// ToC key whose value resolves to the group entities.
    pub multi_root_key: &'static str,
    /// Type tag of groups delivered as the response's own root elements.
    pub single_root_type: &'static str,
    /// Field on each group pointing at its member collection.
    pub group_collection_key: &'static str,
    pub fallback_group_view_key: &'static str,
    /// Field on each fallback group holding a flat URN array.
    pub fallback_group_array_key: &'static str,
    pub fallback_toc_keys: &'static [&'static str],
    pub fallback_type_strings: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStrategy {
    CollectionIndirection,
    GroupArray,
    TocKeys,
    TypeScan,
}

/// Whether a result can be trusted for display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayOrder {
    Preserved,
    Unordered,
}

#[derive(Debug, Clone)]
pub struct GroupResolution<'g> {
    pub entities: Vec<&'g Entity>,
    pub strategy: GroupStrategy,
    pub order: DisplayOrder,
    /// Combined paging of the per-group member collections, when the layout has any.
    pub member_paging: Option<Paging>,
}

impl GroupStrategy {
    pub const CHAIN: [GroupStrategy; 4] = [
        GroupStrategy::CollectionIndirection,
        GroupStrategy::GroupArray,
        GroupStrategy::TocKeys,
        GroupStrategy::TypeScan,
    ];

    pub fn order(self) -> DisplayOrder {
        match self {
            GroupStrategy::TypeScan => DisplayOrder::Unordered,
            _ => DisplayOrder::Preserved,
        }
    }

    /// Runs this strategy alone. `None` means "nothing found, try the next one".
    pub fn resolve<'g>(self, graph: &'g EntityGraph, config: &GroupConfig) -> Option<Vec<&'g Entity>> {
        let found = match self {
            GroupStrategy::CollectionIndirection => indirection_groups(graph, config)
                .into_iter()
                .flat_map(|group| graph.resolve_field(group, config.group_collection_key))
                .collect(),
            GroupStrategy::GroupArray => graph
                .get_values_by_key(&[config.fallback_group_view_key])
                .into_iter()
                .flat_map(|group| graph.resolve_field(group, config.fallback_group_array_key))
                .collect(),
            GroupStrategy::TocKeys => graph.get_values_by_key(config.fallback_toc_keys),
            GroupStrategy::TypeScan => graph.get_elements_by_type(config.fallback_type_strings),
        };
        (!found.is_empty()).then_some(found)
    }

    /// Paging carried by the member collections this strategy walked into.
    /// Only collection indirection has per-group collections.
    pub fn member_paging(self, graph: &EntityGraph, config: &GroupConfig) -> Option<Paging> {
        match self {
            GroupStrategy::CollectionIndirection => Paging::combined(
                indirection_groups(graph, config)
                    .into_iter()
                    .filter_map(|group| graph.paging_for_field(group, config.group_collection_key)),
            ),
            _ => None,
        }
    }
}

/// Groups delivered as the response's own root elements, or else through the
/// multi-root ToC key.
fn indirection_groups<'g>(graph: &'g EntityGraph, config: &GroupConfig) -> Vec<&'g Entity> {
    let top_level = graph.get_elements();
    if !top_level.is_empty() && top_level.iter().all(|e| e.is_type(&[config.single_root_type])) {
        top_level
    } else {
        graph.get_values_by_key(&[config.multi_root_key])
    }
}

/// Walks [`GroupStrategy::CHAIN`], short-circuiting on the first non-empty result.
pub fn get_elements_through_group<'g>(
    graph: &'g EntityGraph,
    config: &GroupConfig,
) -> Option<GroupResolution<'g>> {
    for strategy in GroupStrategy::CHAIN {
        if let Some(entities) = strategy.resolve(graph, config) {
            let order = strategy.order();
            if order == DisplayOrder::Unordered {
                warn!(
                    count = entities.len(),
                    "grouped records resolved by type scan; display order is not guaranteed"
                );
            } else {
                debug!(?strategy, count = entities.len(), "grouped records resolved");
            }
            return Some(GroupResolution {
                entities,
                strategy,
                order,
                member_paging: strategy.member_paging(graph, config),
            });
        }
    }
    None
}
