//! Read-only counts for the landlord and tenant home screens.

pub mod router;
pub mod service;

pub use router::dashboard_router;
pub use service::{DashboardService, LandlordStats, TenantStats};
