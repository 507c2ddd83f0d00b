// libnfcp2p/src/protocol/mod.rs

pub mod ndef;
pub mod parser;
pub mod snep;

pub use ndef::{NdefMessage, NdefRecord};
pub use snep::{SnepClient, SnepHandler, SnepMessage, SnepMessenger, SnepServer};
