// libnfcp2p/src/transport/link.rs

//! Contract with the NFC controller's LLCP layer.
//!
//! Primitives are non-blocking requests; their outcomes arrive later as
//! [`LinkEvent`]s fed to `ConnectionManager::handle_event`, usually from
//! the controller's own callback thread.

use crate::types::{Handle, HwHandle};
use crate::Result;

/// Outcome of a single send on a data link connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    Sent,
    /// Peer window full; retry after a congestion-cleared event.
    Congested,
}

pub trait LinkLayer: Send + Sync {
    /// Register a listening service. Completes with
    /// [`LinkEvent::ServerRegistered`].
    fn register_server(&self, service_name: &str) -> Result<()>;

    /// Register an outbound endpoint. Completes with
    /// [`LinkEvent::ClientRegistered`] carrying the same `token`.
    fn register_client(&self, token: Handle) -> Result<()>;

    fn deregister(&self, registration: HwHandle) -> Result<()>;

    /// Completes with [`LinkEvent::Connected`] or a
    /// [`LinkEvent::Disconnected`] naming `client`.
    fn connect_by_name(&self, client: HwHandle, service_name: &str, miu: u16, rw: u8)
        -> Result<()>;

    fn connect_by_sap(&self, client: HwHandle, sap: u8, miu: u16, rw: u8) -> Result<()>;

    /// Accept a connection announced by [`LinkEvent::ConnectRequest`].
    fn accept(&self, conn: HwHandle, miu: u16, rw: u8) -> Result<()>;

    fn send(&self, conn: HwHandle, data: &[u8]) -> Result<SendStatus>;

    /// Read at most `max_len` bytes of one queued message. Empty when
    /// nothing is pending.
    fn read(&self, conn: HwHandle, max_len: usize) -> Result<Vec<u8>>;

    /// Completes with [`LinkEvent::Disconnected`].
    fn disconnect(&self, conn: HwHandle) -> Result<()>;

    /// Restrict (or with `0`, stop) P2P listening to the given technologies.
    fn set_listen_technology(&self, tech_mask: u32) -> Result<()>;
}

/// Asynchronous notifications from the link layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// `server` is `None` when registration failed.
    ServerRegistered {
        service_name: String,
        server: Option<HwHandle>,
    },
    ClientRegistered {
        token: Handle,
        client: Option<HwHandle>,
    },
    /// A peer wants to connect to one of our servers.
    ConnectRequest {
        server: HwHandle,
        conn: HwHandle,
        remote_miu: u16,
        remote_rw: u8,
    },
    /// Our client's connect completed.
    Connected {
        client: HwHandle,
        conn: HwHandle,
        remote_miu: u16,
        remote_rw: u8,
    },
    /// Names either a connection or, for a failed connect, the client.
    Disconnected { handle: HwHandle },
    DataAvailable { conn: HwHandle },
    Congestion { conn: HwHandle, congested: bool },
    LinkActivated {
        remote_miu: u16,
        remote_lto: u16,
        is_initiator: bool,
    },
    LinkDeactivated,
}
