// libnfcp2p/src/lib.rs

//! libnfcp2p
//!
//! NFC peer-to-peer protocol engine: an NDEF codec, SNEP with
//! fragmentation, and an LLCP connection manager that turns the
//! controller's asynchronous link events into blocking socket calls.
#![warn(missing_docs)]

pub mod config;
pub mod constants;
pub mod error;
pub mod llcp;
pub mod prelude;
pub mod protocol;
pub mod test_support;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export common types at crate root so `crate::Error`, `crate::Result`,
// and the newtypes in `types` are available for consumers and for
// convenient `prelude` re-exports.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
