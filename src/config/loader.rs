use anyhow::{anyhow, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::{debug, error};

use crate::config::settings::{AppConfig, LoggingConfig};

/// Load config from a YAML file, expanding `${VAR}` / `${VAR:default}` first.
pub fn file_to_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config '{}': {}", path.display(), e))?;
    parse_config(&expand_env_vars(&content)?)
}

pub fn parse_config(content: &str) -> Result<AppConfig> {
    let mut config: AppConfig = serde_yaml::from_str(content)
        .inspect_err(|e| error!("parse config error: {}", e))
        .map_err(|e| anyhow!("Invalid config format: {}", e))?;

    // Apply defaults
    if config.logging.is_none() {
        config.logging = Some(LoggingConfig::default());
    }
    debug!("loaded client config {:?}", config.client);

    Ok(config)
}

pub fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]*))?\}")?;
    let expanded = re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    });
    Ok(expanded.into_owned())
}
