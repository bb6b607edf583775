//! Authentication validator
//!
//! Turns an HTTP `Authorization` header into a [`Caller`], using Basic
//! credentials checked against the [`CredentialStore`].

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use super::credentials::CredentialStore;
use crate::auth::Caller;
use crate::error::AuthError;

const MAX_CREDENTIAL_LENGTH: usize = 256;

/// Performs basic input sanitation to check for malicious or malformed usernames/passwords.
fn is_valid_input(input: &str) -> bool {
    !input.trim().is_empty()
        && input.len() <= MAX_CREDENTIAL_LENGTH
        && !input.contains(['\r', '\n', '\0'])
}

/// Identifies the caller of a request.
///
/// No header, or an empty credential store, means an anonymous caller.
/// Otherwise the header must be a well-formed `Basic` credential for a
/// known user. The scheme name is matched case-insensitively.
pub fn caller_from_authorization(
    header: Option<&str>,
    store: &CredentialStore,
) -> Result<Caller, AuthError> {
    let Some(header) = header else {
        return Ok(Caller::anonymous());
    };
    if store.is_empty() {
        return Ok(Caller::anonymous());
    }

    let encoded = match header.trim_start().split_once(' ') {
        Some((scheme, encoded)) if scheme.eq_ignore_ascii_case("Basic") => encoded,
        _ => {
            return Err(AuthError::MalformedInput(
                "Unsupported authorization scheme".into(),
            ));
        }
    };
    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| AuthError::MalformedInput("Invalid base64 credentials".into()))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| AuthError::MalformedInput("Credentials are not UTF-8".into()))?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| AuthError::MalformedInput("Missing ':' in credentials".into()))?;

    if !is_valid_input(username) || !is_valid_input(password) {
        return Err(AuthError::MalformedInput("Invalid credential format".into()));
    }

    store.verify(username, password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn store() -> CredentialStore {
        CredentialStore::new(HashMap::from([(
            "alice".to_string(),
            "alice123".to_string(),
        )]))
    }

    fn basic(credentials: &str) -> String {
        format!("Basic {}", STANDARD.encode(credentials))
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        let caller = caller_from_authorization(None, &store()).unwrap();
        assert!(!caller.is_authenticated());
    }

    #[test]
    fn test_valid_basic_credentials() {
        let header = basic("alice:alice123");
        let caller = caller_from_authorization(Some(&header), &store()).unwrap();
        assert_eq!(caller.username(), Some("alice"));
    }

    #[test]
    fn test_wrong_password() {
        let header = basic("alice:nope");
        assert!(matches!(
            caller_from_authorization(Some(&header), &store()),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let header = format!("bASIC {}", STANDARD.encode("alice:alice123"));
        let caller = caller_from_authorization(Some(&header), &store()).unwrap();
        assert_eq!(caller.username(), Some("alice"));
    }

    #[test]
    fn test_empty_store_ignores_header() {
        let empty = CredentialStore::default();
        for header in [basic("alice:x"), "Bearer abc".to_string()] {
            let caller = caller_from_authorization(Some(&header), &empty).unwrap();
            assert!(!caller.is_authenticated());
        }
    }

    #[test]
    fn test_malformed_headers() {
        for header in [
            "Bearer abc".to_string(),
            "Basic !!!".to_string(),
            basic("no-colon"),
            basic(":alice123"),
            basic("alice:pa\nss"),
        ] {
            assert!(
                matches!(
                    caller_from_authorization(Some(&header), &store()),
                    Err(AuthError::MalformedInput(_))
                ),
                "{}",
                header
            );
        }
    }
}
