//! Configuration management for the RAX File Manager
//!
//! Values come from built-in defaults, then an optional `config.toml`, then
//! environment variables prefixed with `RAX_FM_` (nested keys use `__`,
//! e.g. `RAX_FM_AUTH__ANONYMOUS_READ=true`). Everything is read once at
//! startup and is immutable afterwards.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "config";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_FILE_ROOT: &str = "./static/uploads";
pub const DEFAULT_URL_BASE: &str = "/filemanager";
pub const DEFAULT_MAX_UPLOAD_SIZE_MB: u64 = 100;

const ENV_PREFIX: &str = "RAX_FM";

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address the HTTP listener binds to
    pub bind_address: String,

    pub port: u16,

    /// Directory every client path is confined to; created if missing
    pub file_root: String,

    /// Prefix all routes are mounted under, without a trailing slash
    pub url_base: String,

    /// Request body limit for uploads
    pub max_upload_size_mb: u64,

    #[serde(default)]
    pub auth: AuthConfig,
}

/// Who may use the file manager
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// Username to password. Empty means no login is required at all.
    #[serde(default)]
    pub users: HashMap<String, String>,

    /// Let anonymous callers list, download, view and inspect files
    #[serde(default)]
    pub anonymous_read: bool,
}

impl ServerConfig {
    /// Load configuration from ./config.toml with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from `path` (extension optional) with environment
    /// overrides. A missing file is not an error.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("file_root", DEFAULT_FILE_ROOT)?
            .set_default("url_base", DEFAULT_URL_BASE)?
            .set_default("max_upload_size_mb", DEFAULT_MAX_UPLOAD_SIZE_MB as i64)?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: ServerConfig = settings.try_deserialize()?;
        config.url_base = config.url_base.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.file_root.trim().is_empty() {
            return Err(ConfigError::Message("file_root cannot be empty".into()));
        }

        if !self.url_base.is_empty() && !self.url_base.starts_with('/') {
            return Err(ConfigError::Message(
                "url_base must start with '/'".into(),
            ));
        }

        if self.max_upload_size_mb == 0 {
            return Err(ConfigError::Message(
                "max_upload_size_mb must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Bind address and port as a socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn file_root_path(&self) -> PathBuf {
        PathBuf::from(&self.file_root)
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        (self.max_upload_size_mb as usize).saturating_mul(1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(contents: &str) -> (TempDir, String) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, contents).unwrap();
        let path = path.to_string_lossy().into_owned();
        (temp, path)
    }

    #[test]
    fn test_defaults_when_file_missing() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");

        let config = ServerConfig::load_from(missing.to_str().unwrap()).unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.url_base, DEFAULT_URL_BASE);
        assert_eq!(config.file_root, DEFAULT_FILE_ROOT);
        assert!(config.auth.users.is_empty());
        assert!(!config.auth.anonymous_read);
    }

    #[test]
    fn test_file_values_and_url_base_trimming() {
        let (_temp, path) = write_config(
            r#"
            port = 9000
            file_root = "/srv/files"
            url_base = "/fm/"
            max_upload_size_mb = 5

            [auth]
            anonymous_read = true

            [auth.users]
            alice = "alice123"
            "#,
        );

        let config = ServerConfig::load_from(&path).unwrap();

        assert_eq!(config.socket_addr(), "127.0.0.1:9000");
        assert_eq!(config.file_root_path(), PathBuf::from("/srv/files"));
        assert_eq!(config.url_base, "/fm");
        assert_eq!(config.max_upload_size_bytes(), 5 * 1024 * 1024);
        assert!(config.auth.anonymous_read);
        assert_eq!(config.auth.users.get("alice").map(String::as_str), Some("alice123"));
    }

    #[test]
    fn test_root_url_base_becomes_empty() {
        let (_temp, path) = write_config("url_base = \"/\"\n");
        let config = ServerConfig::load_from(&path).unwrap();
        assert_eq!(config.url_base, "");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for contents in [
            "port = 0\n",
            "file_root = \"  \"\n",
            "url_base = \"fm\"\n",
            "max_upload_size_mb = 0\n",
        ] {
            let (_temp, path) = write_config(contents);
            assert!(ServerConfig::load_from(&path).is_err(), "{}", contents);
        }
    }
}
