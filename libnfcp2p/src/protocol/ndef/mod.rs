// libnfcp2p/src/protocol/ndef/mod.rs

pub mod codec;
pub mod message;
pub mod record;
pub mod well_known;

pub use codec::{parse, serialize};
pub use message::NdefMessage;
pub use record::NdefRecord;
