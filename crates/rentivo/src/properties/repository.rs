use super::domain::Property;
use crate::ids::{PropertyId, UserId};
use crate::store::RepositoryError;

/// Storage abstraction for property documents.
pub trait PropertyRepository: Send + Sync {
    fn insert(&self, property: Property) -> Result<Property, RepositoryError>;
    fn fetch(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError>;
    fn update(&self, property: Property) -> Result<Property, RepositoryError>;
    fn delete(&self, id: &PropertyId) -> Result<(), RepositoryError>;
    /// Properties owned by `landlord_id`, oldest first.
    fn list_by_landlord(&self, landlord_id: &UserId) -> Result<Vec<Property>, RepositoryError>;
}
