use super::domain::{Tenancy, TenancyStatus};
use crate::ids::{PropertyId, TenancyId, UserId};
use crate::store::RepositoryError;

/// Equality and in-set predicates over tenancy documents. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenancyFilter {
    pub user_id: Option<UserId>,
    pub property_ids: Option<Vec<PropertyId>>,
    pub status: Option<TenancyStatus>,
}

impl TenancyFilter {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn for_properties(property_ids: Vec<PropertyId>) -> Self {
        Self {
            property_ids: Some(property_ids),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: TenancyStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, tenancy: &Tenancy) -> bool {
        self.user_id.map_or(true, |id| tenancy.user_id == id)
            && self
                .property_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&tenancy.property_id))
            && self.status.map_or(true, |status| tenancy.status == status)
    }
}

/// Storage abstraction for tenancy documents.
pub trait TenancyRepository: Send + Sync {
    /// Insert unless a current (non-Past) tenancy already links the same user and property.
    /// The check and the write happen atomically; a clash yields [`RepositoryError::Conflict`].
    fn insert_unique(&self, tenancy: Tenancy) -> Result<Tenancy, RepositoryError>;
    fn fetch(&self, id: &TenancyId) -> Result<Option<Tenancy>, RepositoryError>;
    fn update(&self, tenancy: Tenancy) -> Result<Tenancy, RepositoryError>;
    fn delete(&self, id: &TenancyId) -> Result<(), RepositoryError>;
    /// Matching tenancies, oldest first.
    fn find(&self, filter: &TenancyFilter) -> Result<Vec<Tenancy>, RepositoryError>;
    /// Remove every tenancy on the property, returning how many were deleted.
    fn delete_for_property(&self, property_id: &PropertyId) -> Result<usize, RepositoryError>;

    fn count(&self, filter: &TenancyFilter) -> Result<usize, RepositoryError> {
        Ok(self.find(filter)?.len())
    }
}
