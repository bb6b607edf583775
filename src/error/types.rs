//! Error types
//!
//! Defines domain-specific error types for each module of the file manager.

use std::fmt;
use std::io;

use crate::auth::Operation;

/// Authorization errors
#[derive(Debug)]
pub enum AuthError {
    /// The authorizer refused the caller for this operation.
    Unauthorized(Operation),
    /// Unknown user or wrong password; which one is not disclosed.
    InvalidCredentials,
    MalformedInput(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Unauthorized(op) => write!(f, "Unauthorized: {} not permitted", op),
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::MalformedInput(s) => write!(f, "Malformed input: {}", s),
        }
    }
}

impl std::error::Error for AuthError {}

/// Storage module errors
///
/// `AccessDenied` deliberately carries no path: the resolved location of a
/// rejected input is never reported back to the caller.
#[derive(Debug)]
pub enum StorageError {
    AccessDenied,
    NotFound(String),
    InvalidInput(String),
    AlreadyExists(String),
    IoError(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::AccessDenied => write!(f, "Access denied"),
            StorageError::NotFound(p) => write!(f, "Not found: {}", p),
            StorageError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            StorageError::AlreadyExists(p) => write!(f, "Already exists: {}", p),
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}

impl From<walkdir::Error> for StorageError {
    fn from(error: walkdir::Error) -> Self {
        StorageError::IoError(error.into())
    }
}

/// General file manager error that encompasses all error types
#[derive(Debug)]
pub enum FileManagerError {
    Auth(AuthError),
    Storage(StorageError),
    Config(String),
    IoError(io::Error),
}

impl fmt::Display for FileManagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileManagerError::Auth(e) => write!(f, "{}", e),
            FileManagerError::Storage(e) => write!(f, "{}", e),
            FileManagerError::Config(msg) => write!(f, "Configuration error: {}", msg),
            FileManagerError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for FileManagerError {}

impl From<AuthError> for FileManagerError {
    fn from(error: AuthError) -> Self {
        FileManagerError::Auth(error)
    }
}

impl From<StorageError> for FileManagerError {
    fn from(error: StorageError) -> Self {
        FileManagerError::Storage(error)
    }
}

impl From<config::ConfigError> for FileManagerError {
    fn from(error: config::ConfigError) -> Self {
        FileManagerError::Config(error.to_string())
    }
}

impl From<io::Error> for FileManagerError {
    fn from(error: io::Error) -> Self {
        FileManagerError::IoError(error)
    }
}
