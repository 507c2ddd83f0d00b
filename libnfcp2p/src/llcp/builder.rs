// libnfcp2p/src/llcp/builder.rs

use std::sync::Arc;

use crate::config::P2pConfig;
use crate::llcp::manager::ConnectionManager;
use crate::transport::LinkLayer;
use crate::{Error, Result};

/// Helper to construct a ConnectionManager with optional configuration.
#[derive(Default)]
pub struct ConnectionManagerBuilder {
    link: Option<Arc<dyn LinkLayer>>,
    config: P2pConfig,
}

impl ConnectionManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide the link layer (a controller binding, or MockLink in tests)
    pub fn with_link(mut self, link: Arc<dyn LinkLayer>) -> Self {
        self.link = Some(link);
        self
    }

    pub fn with_config(mut self, config: P2pConfig) -> Self {
        self.config = config;
        self
    }

    /// Requires a link layer; otherwise returns LinkUnavailable.
    pub fn build(self) -> Result<Arc<ConnectionManager>> {
        match self.link {
            Some(link) => Ok(ConnectionManager::new(link, self.config)),
            None => Err(Error::LinkUnavailable),
        }
    }
}
