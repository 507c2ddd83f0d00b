//! Utilities for libnfcp2p: small, reusable helpers used across the crate.
//!
//! Hex formatting for log output and the timeout/wait helpers shared by
//! the connection manager.

pub mod hex;
pub mod timeout;

pub use hex::*;
pub use timeout::*;
