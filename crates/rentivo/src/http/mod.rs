//! Shared HTTP plumbing: router assembly, bearer authentication, and error responses.

mod auth;
mod error;
mod extract;

use std::sync::Arc;

use axum::Router;

use crate::config::DomainConfig;
use crate::dashboard::{dashboard_router, DashboardService};
use crate::identity::{identity_router, IdentityService};
use crate::invoices::{invoice_router, InvoiceService};
use crate::properties::{property_router, PropertyService};
use crate::store::Repositories;
use crate::tenancies::{tenancy_router, TenancyService};

pub use auth::bearer_token;
pub use error::{ApiError, ApiResult};
pub use extract::{path_id, JsonBody, OptionalJsonBody};

/// Services shared by every handler.
#[derive(Clone)]
pub struct ApiState {
    pub identity: Arc<IdentityService>,
    pub properties: Arc<PropertyService>,
    pub tenancies: Arc<TenancyService>,
    pub invoices: Arc<InvoiceService>,
    pub dashboard: Arc<DashboardService>,
}

impl ApiState {
    pub fn new(repositories: Repositories, domain: DomainConfig) -> Self {
        Self {
            identity: Arc::new(IdentityService::with_session_ttl(
                repositories.users.clone(),
                domain.session_ttl,
            )),
            properties: Arc::new(PropertyService::new(repositories.clone())),
            tenancies: Arc::new(TenancyService::new(repositories.clone())),
            invoices: Arc::new(InvoiceService::new(
                repositories.clone(),
                domain.invoice_transitions,
            )),
            dashboard: Arc::new(DashboardService::new(repositories)),
        }
    }
}

/// Every `/api` route, bound to `state`.
pub fn api_router(state: ApiState) -> Router {
    Router::new()
        .merge(identity_router())
        .merge(property_router())
        .merge(tenancy_router())
        .merge(invoice_router())
        .merge(dashboard_router())
        .with_state(state)
}
