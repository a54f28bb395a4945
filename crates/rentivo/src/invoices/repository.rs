use super::domain::Invoice;
use crate::ids::{InvoiceId, PropertyId, TenancyId, UserId};
use crate::store::RepositoryError;

/// Equality and in-set predicates over invoice documents. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceFilter {
    pub landlord_id: Option<UserId>,
    pub tenancy_ids: Option<Vec<TenancyId>>,
}

impl InvoiceFilter {
    pub fn issued_by(landlord_id: UserId) -> Self {
        Self {
            landlord_id: Some(landlord_id),
            ..Self::default()
        }
    }

    pub fn for_tenancies(tenancy_ids: Vec<TenancyId>) -> Self {
        Self {
            tenancy_ids: Some(tenancy_ids),
            ..Self::default()
        }
    }

    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.landlord_id
            .map_or(true, |id| invoice.landlord_id == id)
            && self
                .tenancy_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&invoice.tenant_id))
    }
}

/// Storage abstraction for invoice documents.
pub trait InvoiceRepository: Send + Sync {
    fn insert(&self, invoice: Invoice) -> Result<Invoice, RepositoryError>;
    fn fetch(&self, id: &InvoiceId) -> Result<Option<Invoice>, RepositoryError>;
    fn update(&self, invoice: Invoice) -> Result<Invoice, RepositoryError>;
    fn delete(&self, id: &InvoiceId) -> Result<(), RepositoryError>;
    /// Matching invoices, oldest first.
    fn find(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, RepositoryError>;
    fn delete_for_property(&self, property_id: &PropertyId) -> Result<usize, RepositoryError>;
}
