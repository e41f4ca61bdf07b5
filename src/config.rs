//! Client configuration.
//!
//! Endpoint URLs and the CSRF cookie name used to be page globals injected by
//! the hosting template. They are now loaded once and handed to each controller
//! at construction.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::StorefrontError;

// ==================== Defaults ====================

/// Default storefront origin
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default "remove from cart" endpoint path
pub const DEFAULT_REMOVE_FROM_CART_PATH: &str = "/cart/remove/";

/// Default "backup to storage" endpoint path
pub const DEFAULT_BACKUP_PATH: &str = "/backup-to-s3/";

/// Default "restore from storage" endpoint path
pub const DEFAULT_RESTORE_PATH: &str = "/restore-from-s3/";

/// Cookie holding the CSRF token (Django's default name)
pub const DEFAULT_CSRF_COOKIE_NAME: &str = "csrftoken";

/// Where the empty-cart fragment sends the shopper
pub const DEFAULT_CONTINUE_SHOPPING_URL: &str = "/";

/// Delay before a failed backup is reported to the user
pub const BACKUP_ERROR_ALERT_DELAY_MS: u64 = 2000;

/// Cart item fade-out duration
pub const FADE_OUT_MS: u64 = 300;

/// HTTP request timeout
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Config file read by [`ClientConfig::load`]
pub const CONFIG_FILE: &str = "config.toml";

// ==================== File Format ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct AppConfig {
    storefront: Option<StorefrontSection>,
}

#[derive(Debug, Default, Deserialize)]
struct StorefrontSection {
    base_url: Option<String>,
    remove_from_cart_path: Option<String>,
    backup_path: Option<String>,
    restore_path: Option<String>,
    csrf_cookie_name: Option<String>,
    continue_shopping_url: Option<String>,
    backup_error_alert_delay_ms: Option<u64>,
    fade_out_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
}

// ==================== Client Configuration ====================

/// Everything the controllers need to know about the hosting page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub remove_from_cart_path: String,
    pub backup_path: String,
    pub restore_path: String,
    pub csrf_cookie_name: String,
    pub continue_shopping_url: String,
    pub backup_error_alert_delay: Duration,
    pub fade_out: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            remove_from_cart_path: DEFAULT_REMOVE_FROM_CART_PATH.to_string(),
            backup_path: DEFAULT_BACKUP_PATH.to_string(),
            restore_path: DEFAULT_RESTORE_PATH.to_string(),
            csrf_cookie_name: DEFAULT_CSRF_COOKIE_NAME.to_string(),
            continue_shopping_url: DEFAULT_CONTINUE_SHOPPING_URL.to_string(),
            backup_error_alert_delay: Duration::from_millis(BACKUP_ERROR_ALERT_DELAY_MS),
            fade_out: Duration::from_millis(FADE_OUT_MS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Load configuration with priority: config.toml > .env / environment > default
    pub fn load() -> Result<Self, StorefrontError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let path = Path::new(CONFIG_FILE);
        let file = if path.exists() { Some(path) } else { None };
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Build a config from an optional TOML file and an environment lookup.
    ///
    /// Values in the file win over the environment, which wins over defaults.
    pub fn from_sources<F>(file: Option<&Path>, env: F) -> Result<Self, StorefrontError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let section = match file {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    StorefrontError::Config(format!("reading {}: {}", path.display(), e))
                })?;
                let parsed: AppConfig = toml::from_str(&contents).map_err(|e| {
                    StorefrontError::Config(format!("parsing {}: {}", path.display(), e))
                })?;
                tracing::debug!("Loaded storefront config from {}", path.display());
                parsed.storefront.unwrap_or_default()
            }
            None => StorefrontSection::default(),
        };

        let defaults = Self::default();
        let pick = |from_file: Option<String>, key: &str, default: String| {
            from_file.or_else(|| env(key)).unwrap_or(default)
        };

        let config = Self {
            base_url: pick(section.base_url, "STOREFRONT_BASE_URL", defaults.base_url),
            remove_from_cart_path: pick(
                section.remove_from_cart_path,
                "STOREFRONT_REMOVE_FROM_CART_PATH",
                defaults.remove_from_cart_path,
            ),
            backup_path: pick(section.backup_path, "STOREFRONT_BACKUP_PATH", defaults.backup_path),
            restore_path: pick(
                section.restore_path,
                "STOREFRONT_RESTORE_PATH",
                defaults.restore_path,
            ),
            csrf_cookie_name: pick(
                section.csrf_cookie_name,
                "STOREFRONT_CSRF_COOKIE",
                defaults.csrf_cookie_name,
            ),
            continue_shopping_url: pick(
                section.continue_shopping_url,
                "STOREFRONT_SHOP_URL",
                defaults.continue_shopping_url,
            ),
            backup_error_alert_delay: section
                .backup_error_alert_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.backup_error_alert_delay),
            fade_out: section
                .fade_out_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.fade_out),
            request_timeout: section
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        };

        config.validate()?;
        Ok(config)
    }

    /// Override the base URL (CLI flag).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, StorefrontError> {
        self.base_url = base_url.into();
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), StorefrontError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(StorefrontError::Config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.csrf_cookie_name.trim().is_empty() {
            return Err(StorefrontError::Config(
                "csrf_cookie_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Full URL of the "remove from cart" endpoint
    pub fn remove_from_cart_url(&self) -> String {
        join_url(&self.base_url, &self.remove_from_cart_path)
    }

    /// Full URL of the "backup to storage" endpoint
    pub fn backup_url(&self) -> String {
        join_url(&self.base_url, &self.backup_path)
    }

    /// Full URL of the "restore from storage" endpoint
    pub fn restore_url(&self) -> String {
        join_url(&self.base_url, &self.restore_path)
    }
}

/// Join an origin and a path. Absolute paths in `path` are used as-is.
fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

// ==================== Tests ====================
