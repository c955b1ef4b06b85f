use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::{ConsoleApi, DEFAULT_TIMEOUT_SECS};
use crate::session::Session;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    pub token: Option<String>,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[api]
base_url = "http://127.0.0.1:9002"
timeout_secs = 30
"#;

impl Config {
    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        config.api.base_url = crate::utils::remove_trailing_slash(config.api.base_url.trim());
        Ok(config)
    }

    pub fn embedded() -> anyhow::Result<Self> {
        Self::parse(DEFAULT_CONFIG)
    }

    /// Replace the base URL and/or token, e.g. from command-line or
    /// environment overrides collected by the binary.
    pub fn with_overrides(mut self, base_url: Option<String>, token: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = crate::utils::remove_trailing_slash(url.trim());
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.auth.token = Some(token);
        }
        self
    }

    /// Client for the configured backend, carrying the configured token.
    pub fn client(&self) -> ConsoleApi {
        let api = ConsoleApi::with_timeout(&self.api.base_url, self.api.timeout_secs);
        match &self.auth.token {
            Some(token) => api.with_session(Session::with_token(token)),
            None => api,
        }
    }
}

/// Load configuration.
///
/// Search order:
/// 1. `explicit` path, if given (must exist)
/// 2. `config.toml` next to the executable
/// 3. the embedded default
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        tracing::info!("Loading config from: {}", path.display());
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
        return Config::parse(&contents);
    }

    if let Some(config_path) = exe_config_path() {
        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            let contents = std::fs::read_to_string(&config_path)?;
            return Config::parse(&contents);
        }
        tracing::debug!("config.toml not found at: {}", config_path.display());
    }

    tracing::debug!("Using default embedded configuration");
    Config::embedded()
}

fn exe_config_path() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    Some(exe_path.parent()?.join("config.toml"))
}
