use crate::error::Error;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "~/.recall/config.yaml";

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const READWISE_API_KEY_VAR: &str = "READWISE_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: String,
    pub max_tokens: u32,
    pub openai_base_url: Option<String>,
    pub readwise_url: String,
    pub source_url: String,
    pub author: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 700,
            openai_base_url: None,
            readwise_url: "https://readwise.io/api/v2/highlights/".to_string(),
            source_url: "https://chat.openai.com".to_string(),
            author: "OpenAI".to_string(),
        }
    }
}

/// API keys for both providers, read once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub openai_api_key: String,
    pub readwise_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &"<redacted>")
            .field("readwise_api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, Error> {
        Ok(Self {
            openai_api_key: required_var(OPENAI_API_KEY_VAR)?,
            readwise_api_key: required_var(READWISE_API_KEY_VAR)?,
        })
    }
}

fn required_var(name: &'static str) -> Result<String, Error> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::MissingCredential(name)),
    }
}

pub fn load() -> Result<Config> {
    load_from(DEFAULT_CONFIG_PATH)
}

pub fn load_from(path: &str) -> Result<Config> {
    let expanded_config_path = shellexpand::tilde(path);
    let config_path = Path::new(expanded_config_path.as_ref());

    if !config_path.exists() {
        return Ok(Config::default());
    }

    let file_contents = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
    let config: Config = serde_yaml::from_str(&file_contents)
        .with_context(|| format!("Invalid config file {}", config_path.display()))?;

    Ok(config)
}
