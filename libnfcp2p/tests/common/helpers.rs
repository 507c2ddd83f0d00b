// helpers.rs: logging setup and SNEP handlers

use crossbeam_channel::{Receiver, Sender, unbounded};
use libnfcp2p::protocol::ndef::NdefMessage;
use libnfcp2p::protocol::snep::{SnepHandler, SnepMessage};

/// Initialise `env_logger` once; later calls are no-ops.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// SNEP handler forwarding every PUT to a channel and answering SUCCESS.
pub struct ForwardingHandler {
    tx: Sender<NdefMessage>,
}

impl ForwardingHandler {
    pub fn new() -> (Self, Receiver<NdefMessage>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl SnepHandler for ForwardingHandler {
    fn on_put(&self, msg: NdefMessage) -> SnepMessage {
        let _ = self.tx.send(msg);
        SnepMessage::success_response(None)
    }

    fn on_get(&self, _acceptable_length: u32, msg: NdefMessage) -> SnepMessage {
        SnepMessage::success_response(Some(msg))
    }
}
