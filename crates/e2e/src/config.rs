//! Harness configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{E2eError, E2eResult};

/// Environment variable that overrides the API base URL.
pub const BASE_URL_ENV: &str = "BASE_URL";

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Root URL of the bookstore API
    pub base_url: String,

    /// TCP connect timeout
    pub connect_timeout_ms: u64,

    /// Whole-request timeout
    pub request_timeout_ms: u64,

    /// Scenarios allowed to run at the same time
    pub parallelism: usize,

    /// Directory holding the YAML feature files
    pub scenarios_dir: PathBuf,

    /// Where results and the environment file are written
    pub output_dir: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "https://fakerestapi.azurewebsites.net".to_string(),
            connect_timeout_ms: 5_000,
            request_timeout_ms: 10_000,
            parallelism: 1,
            scenarios_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios")),
            output_dir: PathBuf::from("test-results"),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from file, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> E2eResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `BASE_URL` from the process environment, if set.
    pub fn with_env_overrides(self) -> Self {
        self.with_base_url_override(std::env::var(BASE_URL_ENV).ok())
    }

    fn with_base_url_override(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        self
    }

    /// Reject settings the runner cannot work with.
    pub fn validate(&self) -> E2eResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(E2eError::Config("base_url must not be empty".to_string()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(E2eError::Config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.parallelism == 0 {
            return Err(E2eError::Config("parallelism must be at least 1".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(E2eError::Config("request_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn api_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
