//! Tenancy invitations and their lifecycle.

pub mod domain;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{Invitation, InvitationView, Tenancy, TenancyStatus, TenantView};
pub use lifecycle::{TenancyEvent, TenancyOutcome};
pub use repository::{TenancyFilter, TenancyRepository};
pub use router::tenancy_router;
pub use service::TenancyService;
