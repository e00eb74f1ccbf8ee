use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::acquisition::{PageIdentity, ProfileExporter, ProfileFetcher};
use crate::config::Config;

/// One exporter per profile id. The inner lock serializes parses of the same profile.
pub type ExporterRegistry = Arc<Mutex<HashMap<String, Arc<Mutex<ProfileExporter>>>>>;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Live fetcher shared by every exporter. Tests swap in scripted fakes.
    pub fetcher: Arc<dyn ProfileFetcher>,
    pub exporters: ExporterRegistry,
}

impl AppState {
    pub fn new(config: Config, fetcher: Arc<dyn ProfileFetcher>) -> Self {
        Self {
            config,
            fetcher,
            exporters: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The exporter for `page`, created on first use.
    pub async fn exporter_for(&self, page: &PageIdentity) -> Arc<Mutex<ProfileExporter>> {
        let mut exporters = self.exporters.lock().await;
        exporters
            .entry(page.profile_id.to_ascii_lowercase())
            .or_insert_with(|| {
                Arc::new(Mutex::new(ProfileExporter::new(
                    self.fetcher.clone(),
                    page.clone(),
                    self.config.exporter_settings(),
                )))
            })
            .clone()
    }
}
