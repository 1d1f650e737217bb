/// Client configuration
use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file, looked up in the working directory
pub const CONFIG_FILE: &str = "learnlab.toml";

/// Environment variable prefix (`LEARNLAB_API_URL`, `LEARNLAB_ACCESS_TOKEN`, ...)
pub const ENV_PREFIX: &str = "LEARNLAB";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Base URL of the LearnLab API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token sent with API requests
    #[serde(default)]
    pub access_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            access_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Config pointing at `api_url`, everything else default
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Attach a bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Load configuration from `learnlab.toml` and environment
    pub fn load() -> Result<Self> {
        Self::load_from(PathBuf::from(CONFIG_FILE))
    }

    /// Load configuration from the given file and environment
    ///
    /// The file is optional. Environment variables override it.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = self.api_url.trim();
        if url.is_empty() {
            return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::Config(
                "timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
