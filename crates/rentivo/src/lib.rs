//! Property, tenancy, and invoice management for landlords and their tenants.
//!
//! Domain modules each own their records, repository contract, service, and HTTP router. The
//! [`store::MemoryStore`] implements every repository contract, and [`http::api_router`] mounts
//! the routers behind bearer-token authentication.

pub mod access;
pub mod config;
pub mod dashboard;
pub mod dates;
pub mod error;
pub mod http;
pub mod identity;
pub mod ids;
pub mod invoices;
pub mod lifecycle;
pub mod properties;
pub mod store;
pub mod telemetry;
pub mod tenancies;
