//! Getting a normalized response: from the page itself, or over the wire.

pub mod embedded;
pub mod exporter;
pub mod fetcher;
pub mod paginate;

pub use exporter::{ExporterSettings, PageIdentity, ProfileExporter};
pub use fetcher::{ProfileFetcher, VoyagerClient};
pub use paginate::PaginationPolicy;
