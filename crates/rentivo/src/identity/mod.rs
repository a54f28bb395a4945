//! Registration, login, and bearer-session resolution.

pub mod domain;
mod password;
pub mod repository;
pub mod router;
pub mod service;
mod session;

pub use domain::{AuthenticatedUser, Credentials, Registration, Role, User, UserSummary, UserView};
pub use repository::UserRepository;
pub use router::identity_router;
pub use service::IdentityService;
pub(crate) use session::DEFAULT_SESSION_TTL_MINUTES;
