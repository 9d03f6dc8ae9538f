//! Configuration management
//!
//! Two configuration surfaces live here:
//! - [`Config`]: the shared data-store settings, read from an optional
//!   `config.yml` with `NEWSDESK_*` environment overrides.
//! - [`ProbeConfig`]: the registration probe's endpoint, admin credential and
//!   activation flag, read from `GRAPHQL_ENDPOINT`, `ADMIN_TOKEN` and `--run`.
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};

/// Environment variable holding the GraphQL endpoint URL
pub const ENDPOINT_ENV: &str = "GRAPHQL_ENDPOINT";

/// Environment variable holding the admin bearer token
pub const ADMIN_TOKEN_ENV: &str = "ADMIN_TOKEN";

/// Endpoint used when `GRAPHQL_ENDPOINT` is not set
pub const DEFAULT_ENDPOINT: &str = "http://localhost:4000/graphql";

/// Value shipped in setup docs and `.env` templates in place of a real token
pub const PLACEHOLDER_TOKEN: &str = "your-admin-token-here";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database driver (sqlite or mysql)
    #[serde(default)]
    pub driver: DatabaseDriver,
    /// Database connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/newsdesk.db".to_string()
}

/// Database driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    /// SQLite (default)
    #[default]
    Sqlite,
    /// MySQL
    Mysql,
}

/// Error type for configuration parsing and validation
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
    #[error("Missing required value: {0}")]
    MissingValue(&'static str),
    #[error("{0} still holds the placeholder value from the setup template")]
    PlaceholderCredential(&'static str),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist or is empty, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables:
    /// - NEWSDESK_DATABASE_DRIVER
    /// - NEWSDESK_DATABASE_URL
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(driver) = std::env::var("NEWSDESK_DATABASE_DRIVER") {
            match driver.to_lowercase().as_str() {
                "sqlite" => self.database.driver = DatabaseDriver::Sqlite,
                "mysql" => self.database.driver = DatabaseDriver::Mysql,
                _ => {} // Ignore invalid values
            }
        }
        if let Ok(url) = std::env::var("NEWSDESK_DATABASE_URL") {
            self.database.url = url;
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

/// Registration probe settings.
///
/// Built once at startup and handed to the probe's entry point; nothing in the
/// probe reads the environment on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// GraphQL endpoint URL
    pub endpoint: String,
    /// Admin bearer token, `None` when unset or blank
    pub admin_token: Option<String>,
    /// Whether `--run` was passed
    pub run: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            admin_token: None,
            run: false,
        }
    }
}

impl ProbeConfig {
    /// Read `GRAPHQL_ENDPOINT` and `ADMIN_TOKEN`; blank values count as unset.
    pub fn from_env(run: bool) -> Self {
        Self::from_lookup(run, |key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(run: bool, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            endpoint: non_blank(ENDPOINT_ENV).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            admin_token: non_blank(ADMIN_TOKEN_ENV),
            run,
        }
    }

    /// The admin credential, or the reason it cannot be used.
    ///
    /// A token equal to [`PLACEHOLDER_TOKEN`] is rejected. A real token that
    /// happens to match the template string would be rejected as well.
    pub fn credential(&self) -> Result<&str, ConfigError> {
        match self.admin_token.as_deref() {
            None => Err(ConfigError::MissingValue(ADMIN_TOKEN_ENV)),
            Some(PLACEHOLDER_TOKEN) => Err(ConfigError::PlaceholderCredential(ADMIN_TOKEN_ENV)),
            Some(token) => Ok(token),
        }
    }
}

// Shared mutex for config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());


/// Property-based tests for configuration parsing
#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn database_config_strategy() -> impl Strategy<Value = DatabaseConfig> {
        (
            prop_oneof![Just(DatabaseDriver::Sqlite), Just(DatabaseDriver::Mysql)],
            prop_oneof![
                "[a-z][a-z0-9_/]{0,20}\\.db".prop_map(|s| s),
                Just(":memory:".to_string()),
                Just("mysql://root@127.0.0.1:3306/newsdesk".to_string()),
            ],
        )
            .prop_map(|(driver, url)| DatabaseConfig { driver, url })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        /// Serializing any config to YAML and loading it back preserves it.
        #[test]
        fn config_yaml_roundtrip(database in database_config_strategy()) {
            let config = Config { database };
            let yaml = serde_yaml::to_string(&config).expect("Failed to serialize config");

            let mut file = NamedTempFile::new().expect("Failed to create temp file");
            write!(file, "{}", yaml).expect("Failed to write config");

            let parsed = Config::load(file.path()).expect("Failed to parse config");

            prop_assert_eq!(config.database.driver, parsed.database.driver);
            prop_assert_eq!(config.database.url, parsed.database.url);
        }

        /// Any non-blank token other than the placeholder is accepted verbatim.
        #[test]
        fn probe_credential_accepts_real_tokens(token in "[A-Za-z0-9._-]{1,64}") {
            prop_assume!(token != PLACEHOLDER_TOKEN);
            let config = ProbeConfig {
                admin_token: Some(token.clone()),
                ..ProbeConfig::default()
            };
            prop_assert_eq!(config.credential().ok(), Some(token.as_str()));
        }
    }
}
