//! Client configuration
//!
//! Configuration is explicit and fixed at construction. The env-var
//! constructor exists for integrations that want the conventional
//! `SDI_URL` / `SDI_TIMEOUT_SECS` / `SDI_ENABLED` knobs without
//! wiring their own settings layer.

use std::time::Duration;

/// Default backend URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default per-call timeout for `analyze` and `detect`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// SDI client configuration.
#[derive(Debug, Clone)]
pub struct SdiConfig {
    /// Backend base URL, without a trailing slash.
    pub base_url: String,
    /// Per-call timeout, covering connection establishment as well.
    pub timeout: Duration,
    /// Global kill switch; adapters skip analysis entirely when false.
    pub enabled: bool,
}

impl Default for SdiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            enabled: true,
        }
    }
}

impl SdiConfig {
    /// Build a config for the given backend URL, defaults elsewhere.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_base_url(base_url.into()),
            ..Default::default()
        }
    }

    /// Read `SDI_URL`, `SDI_TIMEOUT_SECS` and `SDI_ENABLED` from the
    /// environment, falling back to defaults for anything unset or
    /// unparseable.
    pub fn from_env() -> Self {
        let base_url = std::env::var("SDI_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .map(trim_base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout = std::env::var("SDI_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let enabled = std::env::var("SDI_ENABLED")
            .map(|raw| !matches!(raw.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        Self {
            base_url,
            timeout,
            enabled,
        }
    }

    /// Set the per-call timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the enable flag.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
