//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_BASE_URL` - Public URL for the back office (default: `http://localhost:3001`)
//! - `ADMIN_INVENTORY_PATH` - JSON file for manual inventory entries (in-memory when unset)
//! - `ADMIN_LOW_STOCK_THRESHOLD` - Units at or below which stock is low (default: 10)
//! - `ALLEAVES_BASE_URL` - Alleaves POS API base URL
//! - `ALLEAVES_API_KEY` - Alleaves POS API key (HIGH PRIVILEGE)
//! - `ALLEAVES_MOCK_DELAY_MS` - Mock POS response delay (default: 800)
//! - `ALLEAVES_TIMEOUT_MS` - Upper bound on each POS call (default: 10000)
//! - `JFK_LOG_JSON` - Emit JSON log lines when set to `1` or `true`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0 to 1.0 (default: 0.0)
//!
//! The live Alleaves client is used only when both `ALLEAVES_BASE_URL` and
//! `ALLEAVES_API_KEY` are set; otherwise the mock POS serves static data.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the back office
    pub base_url: String,
    /// Where manual inventory entries are persisted
    pub inventory_path: Option<PathBuf>,
    /// Low stock threshold in units
    pub low_stock_threshold: u32,
    /// Alleaves POS configuration
    pub alleaves: AlleavesConfig,
    /// JSON log output
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Alleaves POS configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct AlleavesConfig {
    /// REST API base URL
    pub base_url: Option<Url>,
    /// API key (HIGH PRIVILEGE - inventory writes)
    pub api_key: Option<SecretString>,
    /// Response delay of the mock POS
    pub mock_delay: Duration,
    /// Upper bound on every POS call
    pub timeout: Duration,
}

impl AlleavesConfig {
    /// Credentials for the live client, if both are configured.
    #[must_use]
    pub fn live_credentials(&self) -> Option<(&Url, &SecretString)> {
        self.base_url.as_ref().zip(self.api_key.as_ref())
    }
}

impl Default for AlleavesConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            mock_delay: Duration::from_millis(800),
            timeout: Duration::from_millis(10_000),
        }
    }
}

impl std::fmt::Debug for AlleavesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlleavesConfig")
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("mock_delay", &self.mock_delay)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed, or if
    /// only one of `ALLEAVES_BASE_URL` and `ALLEAVES_API_KEY` is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("ADMIN_HOST", "127.0.0.1")?;
        let port = parse_env("ADMIN_PORT", "3001")?;
        let base_url = get_env_or_default("ADMIN_BASE_URL", "http://localhost:3001");

        let alleaves = AlleavesConfig {
            base_url: get_optional_env("ALLEAVES_BASE_URL")
                .map(|raw| parse_url("ALLEAVES_BASE_URL", &raw))
                .transpose()?,
            api_key: get_optional_env("ALLEAVES_API_KEY").map(SecretString::from),
            mock_delay: get_millis("ALLEAVES_MOCK_DELAY_MS", 800)?,
            timeout: get_millis("ALLEAVES_TIMEOUT_MS", 10_000)?,
        };
        match (&alleaves.base_url, &alleaves.api_key) {
            (Some(_), None) => return Err(ConfigError::MissingEnvVar("ALLEAVES_API_KEY".into())),
            (None, Some(_)) => return Err(ConfigError::MissingEnvVar("ALLEAVES_BASE_URL".into())),
            _ => {}
        }

        Ok(Self {
            host,
            port,
            base_url,
            inventory_path: get_optional_env("ADMIN_INVENTORY_PATH").map(PathBuf::from),
            low_stock_threshold: parse_env("ADMIN_LOW_STOCK_THRESHOLD", "10")?,
            alleaves,
            log_json: get_optional_env("JFK_LOG_JSON").is_some_and(|v| is_truthy(&v)),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_sample_rate(
                "SENTRY_SAMPLE_RATE",
                &get_env_or_default("SENTRY_SAMPLE_RATE", "1.0"),
            )?,
            sentry_traces_sample_rate: parse_sample_rate(
                "SENTRY_TRACES_SAMPLE_RATE",
                &get_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0"),
            )?,
        })
    }

    /// Configuration for router tests: mock POS with a short delay, no persistence.
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            base_url: "http://localhost:3001".to_string(),
            inventory_path: None,
            low_stock_threshold: 10,
            alleaves: AlleavesConfig {
                mock_delay: Duration::from_millis(5),
                timeout: Duration::from_secs(2),
                ..AlleavesConfig::default()
            },
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn get_millis(key: &str, default_ms: u64) -> Result<Duration, ConfigError> {
    parse_env::<u64>(key, &default_ms.to_string()).map(Duration::from_millis)
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_sample_rate(key: &str, raw: &str) -> Result<f32, ConfigError> {
    let rate = raw
        .trim()
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_alleaves_config_debug_redacts_api_key() {
        let config = AlleavesConfig {
            base_url: Some(Url::parse("https://api.alleaves.com/v1/").unwrap()),
            api_key: Some(SecretString::from("alv_live_7ab31f")),
            ..AlleavesConfig::default()
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("api.alleaves.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("alv_live_7ab31f"));
    }

    #[test]
    fn test_live_credentials_require_both_values() {
        let mut config = AlleavesConfig::default();
        assert!(config.live_credentials().is_none());

        config.base_url = Some(Url::parse("https://api.alleaves.com/v1/").unwrap());
        assert!(config.live_credentials().is_none());

        config.api_key = Some(SecretString::from("alv_live_7ab31f"));
        let (url, key) = config.live_credentials().unwrap();
        assert_eq!(url.host_str(), Some("api.alleaves.com"));
        assert_eq!(key.expose_secret(), "alv_live_7ab31f");
    }

    #[test]
    fn test_parse_sample_rate_bounds() {
        assert!(parse_sample_rate("RATE", "0.5").is_ok());
        assert!(parse_sample_rate("RATE", "2").is_err());
    }

    #[test]
    fn test_for_tests_uses_mock_pos() {
        let config = AdminConfig::for_tests();
        assert!(config.alleaves.live_credentials().is_none());
        assert!(config.inventory_path.is_none());
        assert_eq!(config.socket_addr().port(), 0);
        assert!(!config.is_secure());
    }
}
