// Entity graph: random-access store over a normalized response plus the
// key resolution rules that turn pointer fields into ordered entity lists.

pub mod entity;
pub mod group;
pub mod resolve;
pub mod store;

pub use entity::{Entity, NormalizedResponse, Paging, Urn};
pub use group::{get_elements_through_group, DisplayOrder, GroupConfig};
pub use store::EntityGraph;
