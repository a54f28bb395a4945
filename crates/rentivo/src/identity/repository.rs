use super::domain::User;
use crate::ids::UserId;
use crate::store::RepositoryError;

/// Storage abstraction for user documents.
pub trait UserRepository: Send + Sync {
    /// Insert a new user; fails with [`RepositoryError::Conflict`] when the e-mail is taken.
    fn insert(&self, user: User) -> Result<User, RepositoryError>;
    fn fetch(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    /// Look up by normalized e-mail address.
    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
}
