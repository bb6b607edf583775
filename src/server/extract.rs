//! Request extractors

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::{Caller, caller_from_authorization};
use crate::error::AuthError;
use crate::server::responses::ApiError;
use crate::server::routes::AppState;

/// The caller of the current request, taken from its `Authorization` header.
pub struct RequestCaller(pub Caller);

#[async_trait]
impl FromRequestParts<AppState> for RequestCaller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Without configured users there is nothing to check a header against.
        if state.credentials.is_empty() {
            return Ok(RequestCaller(Caller::anonymous()));
        }

        let header = match parts.headers.get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| {
                ApiError::from(AuthError::MalformedInput(
                    "Authorization header is not ASCII".into(),
                ))
            })?),
            None => None,
        };

        let caller = caller_from_authorization(header, &state.credentials)?;
        Ok(RequestCaller(caller))
    }
}
