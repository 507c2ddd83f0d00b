// libnfcp2p/src/config.rs

//! Runtime configuration for the connection manager and SNEP endpoints.

use std::time::Duration;

use crate::constants::*;
use crate::utils::timeout::default_establish_timeout;

/// Connection manager tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct P2pConfig {
    /// Bound on server/client registration waits. `None` waits forever.
    pub registration_timeout: Option<Duration>,
    /// Bound on connect-by-name/SAP waits. `None` waits forever.
    pub connect_timeout: Option<Duration>,
    /// How long a disconnect waits for the link to confirm before the
    /// connection is dropped anyway.
    pub disconnect_timeout: Option<Duration>,
    pub max_connections_per_server: usize,
    pub listen_tech_mask: u32,
}

impl Default for P2pConfig {
    fn default() -> Self {
        Self {
            registration_timeout: Some(default_establish_timeout()),
            connect_timeout: None,
            disconnect_timeout: Some(default_establish_timeout()),
            max_connections_per_server: MAX_CONNECTIONS_PER_SERVER,
            listen_tech_mask: LISTEN_TECH_P2P_DEFAULT,
        }
    }
}

impl P2pConfig {
    pub fn with_registration_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.registration_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_disconnect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.disconnect_timeout = timeout;
        self
    }

    pub fn with_max_connections_per_server(mut self, max: usize) -> Self {
        self.max_connections_per_server = max;
        self
    }

    pub fn with_listen_tech_mask(mut self, mask: u32) -> Self {
        self.listen_tech_mask = mask;
        self
    }
}

/// SNEP client or server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnepConfig {
    pub service_name: String,
    /// Clients connect to this SAP instead of the service name when set.
    pub sap: Option<u8>,
    pub miu: u16,
    pub rw: u8,
    /// Upper bound on outgoing fragments; the peer's MIU always applies.
    pub fragment_length: Option<usize>,
    pub acceptable_length: u32,
    /// Serve GET requests instead of answering NOT_IMPLEMENTED.
    pub allow_get: bool,
}

impl SnepConfig {
    pub fn client() -> Self {
        Self {
            service_name: SNEP_SERVICE_NAME.to_string(),
            sap: None,
            miu: SNEP_CLIENT_DEFAULT_MIU,
            rw: SNEP_DEFAULT_RW,
            fragment_length: None,
            acceptable_length: SNEP_DEFAULT_ACCEPTABLE_LENGTH,
            allow_get: false,
        }
    }

    pub fn server() -> Self {
        Self {
            miu: SNEP_SERVER_DEFAULT_MIU,
            ..Self::client()
        }
    }

    pub fn with_service_name(mut self, name: &str) -> Self {
        self.service_name = name.to_string();
        self
    }

    pub fn with_sap(mut self, sap: u8) -> Self {
        self.sap = Some(sap);
        self
    }

    pub fn with_miu(mut self, miu: u16) -> Self {
        self.miu = miu;
        self
    }

    pub fn with_fragment_length(mut self, len: usize) -> Self {
        self.fragment_length = Some(len);
        self
    }

    pub fn with_acceptable_length(mut self, len: u32) -> Self {
        self.acceptable_length = len;
        self
    }

    pub fn with_get_enabled(mut self, allow: bool) -> Self {
        self.allow_get = allow;
        self
    }

    /// Fragment length to use against a peer advertising `remote_miu`.
    pub fn fragment_length_for(&self, remote_miu: u16) -> usize {
        let remote = remote_miu as usize;
        match self.fragment_length {
            Some(len) => len.min(remote),
            None => remote,
        }
    }
}

impl Default for SnepConfig {
    fn default() -> Self {
        Self::client()
    }
}
