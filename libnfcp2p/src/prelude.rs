// libnfcp2p/src/prelude.rs

pub use crate::config::{P2pConfig, SnepConfig};
pub use crate::llcp::{
    Connected, ConnectionManager, ConnectionManagerBuilder, LinkInfo, LinkListener,
    LlcpServiceSocket, LlcpSocket, Unconnected,
};
pub use crate::protocol::ndef::{NdefMessage, NdefRecord};
pub use crate::protocol::snep::{SnepClient, SnepHandler, SnepMessage, SnepServer};
pub use crate::transport::{LinkEvent, LinkLayer, SendStatus, Transport};
pub use crate::{Error, FormatError, Handle, HwHandle, Result, ServiceTarget, Tnf};

// Re-export small utilities for convenience
pub use crate::utils::{bytes_to_hex, bytes_to_hex_spaced, ms};
