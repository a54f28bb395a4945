use axum::{extract::State, routing::get, Json, Router};

use super::service::{LandlordStats, TenantStats};
use crate::access::Principal;
use crate::http::{ApiResult, ApiState};

pub fn dashboard_router() -> Router<ApiState> {
    Router::new()
        .route("/api/dashboard/stats", get(landlord_stats_handler))
        .route("/api/dashboard/tenant-stats", get(tenant_stats_handler))
}

pub(crate) async fn landlord_stats_handler(
    State(state): State<ApiState>,
    principal: Principal,
) -> ApiResult<Json<LandlordStats>> {
    Ok(Json(state.dashboard.landlord_stats(&principal)?))
}

pub(crate) async fn tenant_stats_handler(
    State(state): State<ApiState>,
    principal: Principal,
) -> ApiResult<Json<TenantStats>> {
    Ok(Json(state.dashboard.tenant_stats(&principal)?))
}
