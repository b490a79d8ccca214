use anyhow::{Context, Result};
use serde::Deserialize;

use crate::catalog::Catalogs;

/// Environment variable prefix, e.g. `SPEECH_BRIDGE__SERVICE__PORT=9100`
const ENV_PREFIX: &str = "SPEECH_BRIDGE";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub provider: ProviderConfig,
    pub catalog: CatalogConfig,
    pub session: SessionSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub bind: String,
    pub port: u16,
    /// Port for the HTTP status API; disabled when unset
    pub http_port: Option<u16>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "speech-bridge".to_string(),
            bind: "0.0.0.0".to_string(),
            port: 9099,
            http_port: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// WebSocket URL of the transcription engine
    pub url: String,
    pub model: String,
    pub task: String,
    pub use_vad: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:9090".to_string(),
            model: "small".to_string(),
            task: "transcribe".to_string(),
            use_vad: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Supported codecs, most preferred first
    pub codecs: Vec<String>,
    /// Supported languages, most preferred first
    pub languages: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            codecs: vec!["ulaw".to_string(), "slin16".to_string()],
            languages: vec!["en-US".to_string()],
        }
    }
}

impl CatalogConfig {
    pub fn build(&self) -> Result<Catalogs> {
        Catalogs::new(self.codecs.clone(), self.languages.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Push each finalized result to the client as an unsolicited `set`
    pub push_results: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            push_results: true,
        }
    }
}

impl Config {
    /// Load configuration from an optional file, overridden by environment variables
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }
}
