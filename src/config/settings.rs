use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::utils::constants::{DEFAULT_HTTP_TIMEOUT_MS, PRODUCTION_URL, SANDBOX_URL};

/// ================================
/// Config file root
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub client: ClientConfig,
    pub logging: Option<LoggingConfig>,
}

/// ================================
/// UPS client
/// ================================
#[derive(Deserialize, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base API host, e.g. `https://wwwcie.ups.com`
    #[serde(default = "default_environment_url")]
    pub environment_url: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// default per-request timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// concurrent cache misses for one key share a single token exchange
    #[serde(default = "default_coalesce")]
    pub coalesce_token_requests: bool,
}

impl ClientConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Self::default()
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment_url = environment.url().to_owned();
        self
    }

    pub fn with_environment_url(mut self, url: impl Into<String>) -> Self {
        self.environment_url = url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_coalesce_token_requests(mut self, coalesce: bool) -> Self {
        self.coalesce_token_requests = coalesce;
        self
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment_url: default_environment_url(),
            client_id: String::new(),
            client_secret: String::new(),
            timeout_ms: default_timeout_ms(),
            coalesce_token_requests: default_coalesce(),
        }
    }
}

// keep the secret out of logs
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("environment_url", &self.environment_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("timeout_ms", &self.timeout_ms)
            .field("coalesce_token_requests", &self.coalesce_token_requests)
            .finish()
    }
}

/// Well-known UPS API hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    pub fn url(&self) -> &'static str {
        match self {
            Environment::Sandbox => SANDBOX_URL,
            Environment::Production => PRODUCTION_URL,
        }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), format: LogFormat::Compact }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_environment_url() -> String {
    SANDBOX_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}

fn default_coalesce() -> bool {
    true
}
