use devboard_shared::{DEFAULT_API_BASE, TOKEN_STORAGE_KEY};
use serde::{Deserialize, Serialize};

// =========================================================
// 运行时配置 (Runtime Configuration)
// =========================================================

pub const ENV_API_BASE: &str = "DEVBOARD_API_BASE";
pub const ENV_TOKEN_KEY: &str = "DEVBOARD_TOKEN_KEY";

/// Client configuration.
///
/// The browser build uses the defaults; the dev server proxies `/api` to the
/// backend. Native callers usually point `api_base_url` at the backend directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub token_storage_key: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            token_storage_key: TOKEN_STORAGE_KEY.to_string(),
        }
    }
}

impl ClientConfig {
    /// Reads overrides from the process environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            api_base_url: lookup(ENV_API_BASE)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.api_base_url),
            token_storage_key: lookup(ENV_TOKEN_KEY)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.token_storage_key),
        }
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}
