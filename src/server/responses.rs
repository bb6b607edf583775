//! Response envelopes
//!
//! JSON bodies carry a `success` flag; failures add a `message`.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::json;

use crate::error::handlers::{error_to_status_code, handle_error};
use crate::error::{AuthError, FileManagerError, StorageError};

/// Realm offered to browsers when credentials are required
pub const AUTH_REALM: &str = "Basic realm=\"RAX File Manager\"";

/// Error response: logs the error and renders `{"success": false, "message": ...}`.
#[derive(Debug)]
pub struct ApiError(pub FileManagerError);

impl From<FileManagerError> for ApiError {
    fn from(error: FileManagerError) -> Self {
        ApiError(error)
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        ApiError(error.into())
    }
}

impl From<StorageError> for ApiError {
    fn from(error: StorageError) -> Self {
        ApiError(error.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        handle_error(&self.0);

        let status = error_to_status_code(&self.0);
        let body = Json(json!({ "success": false, "message": self.0.to_string() }));
        let mut response = (status, body).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(AUTH_REALM));
        }
        response
    }
}

/// `{"success": true}`
pub fn success() -> Json<serde_json::Value> {
    Json(json!({ "success": true }))
}

/// `Content-Disposition` value for `disposition` (`attachment` or `inline`).
///
/// The quoted `filename` is an ASCII-only fallback; the exact name travels
/// percent-encoded in `filename*`.
pub fn content_disposition(disposition: &str, file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let encoded = utf8_percent_encode(file_name, NON_ALPHANUMERIC);

    format!(
        "{}; filename=\"{}\"; filename*=UTF-8''{}",
        disposition, fallback, encoded
    )
}
