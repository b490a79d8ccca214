use anyhow::Result;
use std::sync::Arc;

use crate::catalog::Catalogs;
use crate::config::{Config, ProviderConfig};

/// Everything a session needs that is not per-session state
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Supported codecs and languages, shared read-only
    pub catalogs: Arc<Catalogs>,

    /// Provider handshake settings
    pub provider: ProviderConfig,

    /// Push finalized results to the client as they are produced
    pub push_results: bool,
}

impl SessionConfig {
    pub fn new(catalogs: Arc<Catalogs>) -> Self {
        Self {
            catalogs,
            provider: ProviderConfig::default(),
            push_results: true,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            catalogs: Arc::new(config.catalog.build()?),
            provider: config.provider.clone(),
            push_results: config.session.push_results,
        })
    }
}
