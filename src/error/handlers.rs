//! Error handlers
//!
//! Maps errors onto HTTP status codes and logs them.

use axum::http::StatusCode;
use log::{error, warn};

use crate::error::types::{AuthError, FileManagerError, StorageError};

/// Log a file manager error at a level matching its severity
pub fn handle_error(err: &FileManagerError) {
    match err {
        FileManagerError::Auth(_) => warn!("Request refused: {}", err),
        // The attempted path is intentionally not part of this line.
        FileManagerError::Storage(StorageError::AccessDenied) => {
            warn!("Rejected path outside the file root")
        }
        FileManagerError::Storage(StorageError::IoError(_)) | FileManagerError::IoError(_) => {
            error!("File manager error: {}", err)
        }
        FileManagerError::Config(_) => error!("{}", err),
        FileManagerError::Storage(_) => {}
    }
}

/// Convert error to HTTP status code
pub fn error_to_status_code(err: &FileManagerError) -> StatusCode {
    match err {
        FileManagerError::Auth(AuthError::MalformedInput(_)) => StatusCode::BAD_REQUEST,
        FileManagerError::Auth(_) => StatusCode::UNAUTHORIZED,
        FileManagerError::Storage(e) => storage_error_status(e),
        FileManagerError::Config(_) | FileManagerError::IoError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn storage_error_status(err: &StorageError) -> StatusCode {
    match err {
        StorageError::AccessDenied => StatusCode::FORBIDDEN,
        StorageError::NotFound(_) => StatusCode::NOT_FOUND,
        StorageError::InvalidInput(_) | StorageError::AlreadyExists(_) => StatusCode::BAD_REQUEST,
        StorageError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
