//! Repository errors, the repository bundle handed to services, and the document store.

mod memory;
mod snapshot;

use std::sync::Arc;

pub use memory::MemoryStore;

use crate::identity::UserRepository;
use crate::invoices::InvoiceRepository;
use crate::properties::PropertyRepository;
use crate::tenancies::TenancyRepository;

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// One handle per entity collection. Cloning shares the underlying store.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub properties: Arc<dyn PropertyRepository>,
    pub tenancies: Arc<dyn TenancyRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
}

impl Repositories {
    /// Serve every collection from the same document store.
    pub fn shared(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            properties: store.clone(),
            tenancies: store.clone(),
            invoices: store,
        }
    }

    pub fn in_memory() -> Self {
        Self::shared(Arc::new(MemoryStore::default()))
    }
}
