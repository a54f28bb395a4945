use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use super::domain::{Property, PropertyInput};
use crate::access::Principal;
use crate::http::{path_id, ApiResult, ApiState, JsonBody};
use crate::ids::PropertyId;

const MISSING: &str = "Property not found";

pub fn property_router() -> Router<ApiState> {
    Router::new()
        .route(
            "/api/properties",
            get(list_handler).post(create_handler),
        )
        .route(
            "/api/properties/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
}

pub(crate) async fn list_handler(
    State(state): State<ApiState>,
    principal: Principal,
) -> ApiResult<Json<Vec<Property>>> {
    Ok(Json(state.properties.list(&principal)?))
}

pub(crate) async fn create_handler(
    State(state): State<ApiState>,
    principal: Principal,
    JsonBody(input): JsonBody<PropertyInput>,
) -> ApiResult<(StatusCode, Json<Property>)> {
    let property = state.properties.create(&principal, input)?;
    Ok((StatusCode::CREATED, Json(property)))
}

pub(crate) async fn get_handler(
    State(state): State<ApiState>,
    principal: Principal,
    Path(raw): Path<String>,
) -> ApiResult<Json<Property>> {
    let id = path_id(&raw, PropertyId::parse, MISSING)?;
    Ok(Json(state.properties.get(&principal, &id)?))
}

pub(crate) async fn update_handler(
    State(state): State<ApiState>,
    principal: Principal,
    Path(raw): Path<String>,
    JsonBody(patch): JsonBody<PropertyInput>,
) -> ApiResult<Json<Property>> {
    let id = path_id(&raw, PropertyId::parse, MISSING)?;
    Ok(Json(state.properties.update(&principal, &id, patch)?))
}

pub(crate) async fn delete_handler(
    State(state): State<ApiState>,
    principal: Principal,
    Path(raw): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = path_id(&raw, PropertyId::parse, MISSING)?;
    state.properties.delete(&principal, &id)?;
    Ok(Json(json!({ "id": id })))
}
