use metrics_exporter_prometheus::PrometheusHandle;
use rentivo::config::StorageConfig;
use rentivo::store::{MemoryStore, Repositories, RepositoryError};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Open the document store described by `storage`: snapshot-backed when a data file is
/// configured, memory-only otherwise.
pub(crate) fn repositories(storage: &StorageConfig) -> Result<Repositories, RepositoryError> {
    match &storage.data_file {
        Some(path) => {
            let store = MemoryStore::open(path)?;
            info!(path = %path.display(), "document store opened");
            Ok(Repositories::shared(Arc::new(store)))
        }
        None => {
            info!("document store is memory-only");
            Ok(Repositories::in_memory())
        }
    }
}
