use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};

use super::domain::{Invitation, InvitationView, Tenancy, TenantView};
use crate::access::Principal;
use crate::dates::deserialize_optional_date;
use crate::http::{path_id, ApiResult, ApiState, JsonBody, OptionalJsonBody};
use crate::ids::TenancyId;

const MISSING: &str = "Tenancy not found";

/// Body of `POST /api/tenants/expire`; `asOf` defaults to the server's local date.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryRequest {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub as_of: Option<NaiveDate>,
}

pub fn tenancy_router() -> Router<ApiState> {
    Router::new()
        .route("/api/tenants", get(list_tenants_handler).post(invite_handler))
        .route("/api/tenants/my-invitations", get(list_invitations_handler))
        .route("/api/tenants/expire", post(expire_handler))
        .route("/api/tenants/:id", delete(remove_handler))
        .route("/api/tenants/:id/accept", put(accept_handler))
        .route("/api/tenants/:id/reject", put(reject_handler))
}

pub(crate) async fn invite_handler(
    State(state): State<ApiState>,
    principal: Principal,
    JsonBody(invitation): JsonBody<Invitation>,
) -> ApiResult<(StatusCode, Json<Tenancy>)> {
    let tenancy = state.tenancies.invite(&principal, invitation)?;
    Ok((StatusCode::CREATED, Json(tenancy)))
}

pub(crate) async fn list_tenants_handler(
    State(state): State<ApiState>,
    principal: Principal,
) -> ApiResult<Json<Vec<TenantView>>> {
    Ok(Json(state.tenancies.list_tenants(&principal)?))
}

pub(crate) async fn list_invitations_handler(
    State(state): State<ApiState>,
    principal: Principal,
) -> ApiResult<Json<Vec<InvitationView>>> {
    Ok(Json(state.tenancies.list_invitations(&principal)?))
}

pub(crate) async fn accept_handler(
    State(state): State<ApiState>,
    principal: Principal,
    Path(raw): Path<String>,
) -> ApiResult<Json<Tenancy>> {
    let id = path_id(&raw, TenancyId::parse, MISSING)?;
    Ok(Json(state.tenancies.accept(&principal, &id)?))
}

pub(crate) async fn reject_handler(
    State(state): State<ApiState>,
    principal: Principal,
    Path(raw): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = path_id(&raw, TenancyId::parse, MISSING)?;
    state.tenancies.reject(&principal, &id)?;
    Ok(Json(json!({ "message": "Invitation rejected" })))
}

pub(crate) async fn remove_handler(
    State(state): State<ApiState>,
    principal: Principal,
    Path(raw): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = path_id(&raw, TenancyId::parse, MISSING)?;
    state.tenancies.remove(&principal, &id)?;
    Ok(Json(json!({ "message": "Tenant removed" })))
}

pub(crate) async fn expire_handler(
    State(state): State<ApiState>,
    principal: Principal,
    OptionalJsonBody(body): OptionalJsonBody<ExpiryRequest>,
) -> ApiResult<Json<Vec<Tenancy>>> {
    let as_of = body
        .and_then(|request| request.as_of)
        .unwrap_or_else(|| Local::now().date_naive());
    Ok(Json(state.tenancies.expire_leases(&principal, as_of)?))
}
