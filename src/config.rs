//! Engine configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the engine is built.
//!
//! ```bash
//! export APPLINK_APP_ID="0f1e2d3c-..."
//! export APPLINK_BASE_URL="https://api.appsonair.com/"
//! ```
//!
//! ## Optional Variables
//!
//! - `APPLINK_APP_ID` - Application identifier (lookups answer "App id missing!" when empty)
//! - `APPLINK_BASE_URL` - Backend base URL (default: `https://api.appsonair.com/`)
//! - `APPLINK_HTTP_TIMEOUT_SECS` - Request timeout (default: 30, range: 1-300)
//! - `APPLINK_STORE_DIR` - Directory of the file-backed store (default: `.applink`)
//! - `APPLINK_OFFLINE` - Start with the connectivity flag unset (default: `false`)
//! - `APPLINK_FALLBACK_OPENER` - Program opening fallback URLs (default: `xdg-open`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.appsonair.com/";

/// Engine configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Application identifier sent as `x-application-key`. May be empty.
    pub app_id: String,
    /// Backend base URL, always ending with `/`.
    pub base_url: Url,
    pub http_timeout_secs: u64,
    pub store_dir: PathBuf,
    /// When true, the connectivity flag starts unset and lookups answer
    /// "No Network Available!" without touching the network.
    pub offline: bool,
    /// Program used to open fallback URLs. Empty disables opening; URLs are logged.
    pub fallback_opener: String,
    pub log_level: String,
    pub log_format: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `APPLINK_BASE_URL` is not a valid URL.
    pub fn from_env() -> Result<Self> {
        let app_id = env::var("APPLINK_APP_ID")
            .map(|v| v.trim().to_string())
            .unwrap_or_default();

        let base_url = Self::load_base_url().context("Failed to load backend configuration")?;

        let http_timeout_secs = env::var("APPLINK_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let store_dir = env::var("APPLINK_STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".applink"));

        let offline = env::var("APPLINK_OFFLINE")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        let fallback_opener =
            env::var("APPLINK_FALLBACK_OPENER").unwrap_or_else(|_| "xdg-open".to_string());

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        Ok(Self {
            app_id,
            base_url,
            http_timeout_secs,
            store_dir,
            offline,
            fallback_opener,
            log_level,
            log_format,
        })
    }

    /// Loads the backend base URL, normalizing it to end with `/`.
    ///
    /// Endpoint paths are appended to the base path, so `https://host/api` and
    /// `https://host/api/` address the same endpoints.
    fn load_base_url() -> Result<Url> {
        let raw = env::var("APPLINK_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut url =
            Url::parse(raw.trim()).with_context(|| format!("Invalid APPLINK_BASE_URL '{raw}'"))?;

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(url)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `base_url` is not `http` or `https`, or has no host
    /// - `http_timeout_secs` is outside 1-300
    /// - `log_format` is not `text` or `json`
    /// - `store_dir` is empty
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.base_url.scheme(), "http" | "https") {
            anyhow::bail!(
                "APPLINK_BASE_URL must start with 'http://' or 'https://', got '{}'",
                self.base_url
            );
        }

        if self.base_url.host_str().is_none_or(str::is_empty) {
            anyhow::bail!("APPLINK_BASE_URL must have a host, got '{}'", self.base_url);
        }

        if self.http_timeout_secs == 0 || self.http_timeout_secs > 300 {
            anyhow::bail!(
                "APPLINK_HTTP_TIMEOUT_SECS must be between 1 and 300, got {}",
                self.http_timeout_secs
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if self.store_dir.as_os_str().is_empty() {
            anyhow::bail!("APPLINK_STORE_DIR must not be empty");
        }

        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Returns whether lookups can reach the backend at all.
    pub fn has_app_id(&self) -> bool {
        !self.app_id.is_empty()
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Backend: {}", self.base_url);

        if self.has_app_id() {
            tracing::info!("  App id: {}", mask_app_id(&self.app_id));
        } else {
            tracing::warn!("  App id: missing (lookups will answer \"App id missing!\")");
        }

        tracing::info!("  HTTP timeout: {}s", self.http_timeout_secs);
        tracing::info!("  Store: {}", self.store_dir.display());
        tracing::info!("  Offline: {}", self.offline);

        if self.fallback_opener.is_empty() {
            tracing::info!("  Fallback opener: disabled");
        } else {
            tracing::info!("  Fallback opener: {}", self.fallback_opener);
        }

        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

/// Masks an application identifier for logging, keeping the last four characters.
///
/// - `0f1e2d3c-aaaa-bbbb` → `***bbbb`
/// - `abcd` → `***`
fn mask_app_id(app_id: &str) -> String {
    let chars: Vec<char> = app_id.chars().collect();
    if chars.len() <= 4 {
        return "***".to_string();
    }

    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("***{tail}")
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable is malformed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
