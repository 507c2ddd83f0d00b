// libnfcp2p/src/transport/mod.rs

pub mod link;
pub mod mock;
pub mod traits;

pub use link::{LinkEvent, LinkLayer, SendStatus};
pub use mock::{LinkCall, MockLink, MockTransport};
pub use traits::Transport;
