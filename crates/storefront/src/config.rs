//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `HEAVYLINE_API_URL` - Base URL of the catalog/order REST API
//!
//! ## Optional
//! - `HEAVYLINE_DATA_DIR` - Directory for locally persisted state (default: `.heavyline`)
//! - `HEAVYLINE_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds (default: 15)
//! - `HEAVYLINE_LOG_FORMAT` - `pretty` or `json` (default: pretty)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_DATA_DIR: &str = ".heavyline";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "15";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format for the subscriber installed by binaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the REST API; always ends with `/` so relative joins keep the path.
    pub api_url: Url,
    /// Directory holding the persisted cart and auth token
    pub data_dir: PathBuf,
    /// Timeout applied to every API request
    pub http_timeout: Duration,
    /// Log output format
    pub log_format: LogFormat,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_required_env("HEAVYLINE_API_URL")?)?;
        let data_dir = PathBuf::from(get_env_or_default("HEAVYLINE_DATA_DIR", DEFAULT_DATA_DIR));
        let http_timeout = get_env_or_default("HEAVYLINE_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("HEAVYLINE_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        let log_format = parse_log_format(get_optional_env("HEAVYLINE_LOG_FORMAT").as_deref())?;

        Ok(Self {
            api_url,
            data_dir,
            http_timeout,
            log_format,
        })
    }

    /// Configuration pointing at `api_url` with defaults for everything else.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse.
    pub fn for_api(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            http_timeout: Duration::from_secs(15),
            log_format: LogFormat::default(),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the API base URL, normalizing it to end with a slash.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("HEAVYLINE_API_URL".to_string(), msg);

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_log_format(raw: Option<&str>) -> Result<LogFormat, ConfigError> {
    match raw.map(str::trim) {
        None | Some("" | "pretty") => Ok(LogFormat::Pretty),
        Some("json") => Ok(LogFormat::Json),
        Some(other) => Err(ConfigError::InvalidEnvVar(
            "HEAVYLINE_LOG_FORMAT".to_string(),
            format!("expected 'pretty' or 'json', got '{other}'"),
        )),
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_gets_trailing_slash() {
        let url = parse_api_url("http://localhost:8000/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/");
        assert_eq!(
            url.join("requests/create-order").unwrap().as_str(),
            "http://localhost:8000/api/requests/create-order"
        );
    }

    #[test]
    fn test_api_url_root_is_unchanged() {
        let url = parse_api_url("https://shop.example.ru").unwrap();
        assert_eq!(url.as_str(), "https://shop.example.ru/");
    }

    #[test]
    fn test_api_url_rejects_garbage() {
        assert!(matches!(
            parse_api_url("not a url"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            parse_api_url("ftp://files.example.ru"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_log_format() {
        assert_eq!(parse_log_format(None).unwrap(), LogFormat::Pretty);
        assert_eq!(parse_log_format(Some("json")).unwrap(), LogFormat::Json);
        assert!(parse_log_format(Some("xml")).is_err());
    }

    #[test]
    fn test_for_api_defaults() {
        let config = StorefrontConfig::for_api("http://127.0.0.1:8000").unwrap();
        assert_eq!(config.http_timeout, Duration::from_secs(15));
        assert_eq!(config.data_dir, PathBuf::from(".heavyline"));
    }
}
