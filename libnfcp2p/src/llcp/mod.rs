// libnfcp2p/src/llcp/mod.rs

//! LLCP connection management: the manager that bridges blocking callers
//! with link-layer events, and the socket API built on top of it.

pub mod builder;
mod connection;
pub mod listener;
pub mod manager;
mod registry;
pub mod socket;

pub use builder::ConnectionManagerBuilder;
pub use listener::{LinkInfo, LinkListener};
pub use manager::ConnectionManager;
pub use socket::{Connected, LlcpServiceSocket, LlcpSocket, Unconnected};
