use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use super::ApiError;
use crate::error::ServiceError;

/// JSON body whose rejections render as validation errors instead of axum's plain-text ones.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ServiceError::validation(rejection.body_text()).into()),
        }
    }
}

/// JSON body that may be left out. An empty body yields `None`; anything else must decode as
/// `T` or the request is rejected as a validation error.
pub struct OptionalJsonBody<T>(pub Option<T>);

#[axum::async_trait]
impl<T, S> FromRequest<S> for OptionalJsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::from(ServiceError::validation(rejection.body_text())))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(None));
        }

        match Json::<T>::from_bytes(&bytes) {
            Ok(Json(value)) => Ok(Self(Some(value))),
            Err(rejection) => Err(ServiceError::validation(rejection.body_text()).into()),
        }
    }
}

/// Parse a path identifier. Malformed ids cannot name a stored record, so they read as missing.
pub fn path_id<T>(
    raw: &str,
    parse: impl FnOnce(&str) -> Option<T>,
    missing: &'static str,
) -> Result<T, ApiError> {
    parse(raw).ok_or_else(|| ServiceError::not_found(missing).into())
}
