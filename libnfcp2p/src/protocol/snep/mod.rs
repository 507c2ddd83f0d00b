// libnfcp2p/src/protocol/snep/mod.rs

//! Simple NDEF Exchange Protocol: message codec, fragmenting messenger,
//! and the client/server endpoints.

pub mod client;
pub mod message;
pub mod messenger;
pub mod server;

pub use client::SnepClient;
pub use message::{SnepMessage, field_name};
pub use messenger::SnepMessenger;
pub use server::{SnepHandler, SnepServer};
