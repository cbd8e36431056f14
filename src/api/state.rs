use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::data::Dataset;
use crate::services::providers::MetadataProvider;

/// Shared application state
///
/// The dataset is loaded once before the router is built and is never written
/// afterwards, so handlers read it without locking.
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub metadata_provider: Arc<dyn MetadataProvider>,
    /// Caps concurrent provider lookups process-wide
    pub lookup_permits: Arc<Semaphore>,
    pub default_k: usize,
}

impl AppState {
    pub fn new(
        dataset: Arc<Dataset>,
        metadata_provider: Arc<dyn MetadataProvider>,
        default_k: usize,
        max_concurrent_lookups: usize,
    ) -> Self {
        Self {
            dataset,
            metadata_provider,
            // Zero permits would stall every enriched request
            lookup_permits: Arc::new(Semaphore::new(max_concurrent_lookups.max(1))),
            default_k,
        }
    }
}
