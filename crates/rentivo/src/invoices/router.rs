use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};

use super::domain::{Invoice, InvoiceDraft, InvoiceView, StatusChange};
use crate::access::Principal;
use crate::http::{path_id, ApiResult, ApiState, JsonBody};
use crate::ids::InvoiceId;

const MISSING: &str = "Invoice not found";

pub fn invoice_router() -> Router<ApiState> {
    Router::new()
        .route("/api/invoices", get(list_handler).post(create_handler))
        .route("/api/invoices/:id", get(get_handler).delete(delete_handler))
        .route("/api/invoices/:id/status", put(update_status_handler))
}

pub(crate) async fn create_handler(
    State(state): State<ApiState>,
    principal: Principal,
    JsonBody(draft): JsonBody<InvoiceDraft>,
) -> ApiResult<(StatusCode, Json<Invoice>)> {
    let invoice = state.invoices.create(&principal, draft)?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

pub(crate) async fn list_handler(
    State(state): State<ApiState>,
    principal: Principal,
) -> ApiResult<Json<Vec<InvoiceView>>> {
    Ok(Json(state.invoices.list(&principal)?))
}

pub(crate) async fn get_handler(
    State(state): State<ApiState>,
    principal: Principal,
    Path(raw): Path<String>,
) -> ApiResult<Json<InvoiceView>> {
    let id = path_id(&raw, InvoiceId::parse, MISSING)?;
    Ok(Json(state.invoices.get(&principal, &id)?))
}

pub(crate) async fn update_status_handler(
    State(state): State<ApiState>,
    principal: Principal,
    Path(raw): Path<String>,
    JsonBody(change): JsonBody<StatusChange>,
) -> ApiResult<Json<Invoice>> {
    let id = path_id(&raw, InvoiceId::parse, MISSING)?;
    Ok(Json(state.invoices.update_status(&principal, &id, change)?))
}

pub(crate) async fn delete_handler(
    State(state): State<ApiState>,
    principal: Principal,
    Path(raw): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = path_id(&raw, InvoiceId::parse, MISSING)?;
    state.invoices.delete(&principal, &id)?;
    Ok(Json(json!({ "message": "Invoice removed" })))
}
