//! Client configuration.

use crate::error::ConfigError;

/// Production endpoint of the reseller API.
pub const DEFAULT_BASE_URL: &str = "https://cp.hostnine.com/api/";

pub const ENV_API_KEY: &str = "HOSTNINE_API_KEY";
pub const ENV_BASE_URL: &str = "HOSTNINE_API_URL";

/// Where to send requests and which key to attach to them.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
}

impl ClientConfig {
    /// Config for the production endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Reads `HOSTNINE_API_KEY` and, if set, `HOSTNINE_API_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var(ENV_API_KEY).map_err(|_| ConfigError::MissingEnv(ENV_API_KEY))?;
        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        Ok(config)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
