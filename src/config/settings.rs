use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::context::ExecutionContext;

/// ================================
/// Runtime settings
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    /// Base URL for server-issued calls (internal network address).
    pub server_base_url: String,
    /// Base URL for browser-issued calls (public network address).
    pub browser_base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Mark credential cookies `Secure`. On in production.
    #[serde(default)]
    pub secure_cookies: bool,
}

impl ApiSettings {
    pub fn from_env() -> Result<Self> {
        let server_base_url = std::env::var("API_INTERNAL_URL")?;
        let browser_base_url =
            std::env::var("API_PUBLIC_URL").unwrap_or_else(|_| server_base_url.clone());
        let timeout_ms = std::env::var("API_TIMEOUT_MS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_else(default_timeout_ms);
        let secure_cookies = std::env::var("COOKIE_SECURE")
            .map(|raw| raw == "1" || raw.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        Ok(Self {
            server_base_url,
            browser_base_url,
            timeout_ms,
            secure_cookies,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Server-scoped contexts call the internal address, everything else the
    /// public one.
    pub fn base_url_for(&self, context: &dyn ExecutionContext) -> &str {
        if context.is_server_scoped() {
            &self.server_base_url
        } else {
            &self.browser_base_url
        }
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}
