//! Credential storage and management
//!
//! Handles user credential storage and validation.

use std::collections::HashMap;

use crate::auth::Caller;
use crate::error::AuthError;

/// Username to password map loaded from configuration
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(users: HashMap<String, String>) -> Self {
        Self { users }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Checks a username/password pair, yielding the authenticated caller.
    pub fn verify(&self, username: &str, password: &str) -> Result<Caller, AuthError> {
        match self.users.get(username) {
            Some(stored) if stored == password => Ok(Caller::authenticated(username)),
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}
