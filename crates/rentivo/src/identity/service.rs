use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use super::domain::{
    normalize_email, AuthenticatedUser, Credentials, Registration, Role, User, UserView,
};
use super::password;
use super::repository::UserRepository;
use super::session::SessionRegistry;
use crate::access::Principal;
use crate::error::{non_blank, ServiceError};
use crate::ids::UserId;
use crate::store::RepositoryError;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Issues and resolves bearer sessions on top of the user repository.
pub struct IdentityService {
    users: Arc<dyn UserRepository>,
    sessions: SessionRegistry,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            users,
            sessions: SessionRegistry::default(),
        }
    }

    /// Like [`IdentityService::new`], with tokens that expire `session_ttl` after login.
    pub fn with_session_ttl(users: Arc<dyn UserRepository>, session_ttl: Duration) -> Self {
        Self {
            users,
            sessions: SessionRegistry::new(session_ttl),
        }
    }

    /// Create a user account and open a session for it.
    pub fn register(
        &self,
        registration: Registration,
    ) -> Result<AuthenticatedUser, ServiceError> {
        let missing = || ServiceError::validation("Please fill in all fields");

        let name = non_blank(registration.name).ok_or_else(missing)?;
        let email = non_blank(registration.email)
            .map(|email| normalize_email(&email))
            .ok_or_else(missing)?;
        let phone = non_blank(registration.phone).ok_or_else(missing)?;
        let password = registration
            .password
            .filter(|password| !password.is_empty())
            .ok_or_else(missing)?;
        let raw_role = non_blank(registration.role).ok_or_else(missing)?;
        let role = Role::parse(&raw_role)
            .ok_or_else(|| ServiceError::validation(format!("Unknown role '{raw_role}'")))?;

        let password_hash = password::hash(&password).map_err(ServiceError::PasswordHash)?;
        let user = User {
            id: UserId::generate(),
            name,
            password_hash,
            email,
            phone,
            role,
            created_at: Utc::now(),
        };

        let stored = self.users.insert(user).map_err(|err| match err {
            RepositoryError::Conflict => ServiceError::conflict("User already exists"),
            other => ServiceError::Repository(other),
        })?;

        info!(user_id = %stored.id, role = %stored.role, "user registered");
        self.open_session(&stored)
    }

    /// Verify credentials and open a new session.
    pub fn login(&self, credentials: Credentials) -> Result<AuthenticatedUser, ServiceError> {
        let email = non_blank(credentials.email)
            .map(|email| normalize_email(&email))
            .ok_or_else(|| ServiceError::validation("Please provide email and password"))?;
        let password = credentials
            .password
            .filter(|password| !password.is_empty())
            .ok_or_else(|| ServiceError::validation("Please provide email and password"))?;

        let user = self
            .users
            .find_by_email(&email)?
            .filter(|user| password::verify(&password, &user.password_hash))
            .ok_or_else(|| {
                warn!("login rejected");
                ServiceError::unauthorized(INVALID_CREDENTIALS)
            })?;

        self.open_session(&user)
    }

    /// Map a bearer token to the acting principal.
    pub fn resolve(&self, token: &str) -> Result<Principal, ServiceError> {
        let user_id = self
            .sessions
            .lookup(token)?
            .ok_or_else(|| ServiceError::unauthorized("Not authorized, token failed"))?;

        let user = self
            .users
            .fetch(&user_id)?
            .ok_or_else(|| ServiceError::unauthorized("Not authorized, user not found"))?;

        Ok(Principal::new(user.id, user.role))
    }

    pub fn current_user(&self, principal: &Principal) -> Result<UserView, ServiceError> {
        self.users
            .fetch(&principal.id)?
            .map(|user| user.view())
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }

    fn open_session(&self, user: &User) -> Result<AuthenticatedUser, ServiceError> {
        let token = self.sessions.issue(user.id)?;
        Ok(AuthenticatedUser {
            user: user.view(),
            token,
        })
    }
}
