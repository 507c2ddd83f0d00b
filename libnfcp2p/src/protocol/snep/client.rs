// libnfcp2p/src/protocol/snep/client.rs

use std::sync::Arc;

use log::debug;

use super::message::{SnepMessage, field_name};
use super::messenger::SnepMessenger;
use crate::config::SnepConfig;
use crate::llcp::{ConnectionManager, Connected, LlcpSocket};
use crate::protocol::ndef::NdefMessage;
use crate::transport::Transport;
use crate::types::ServiceTarget;
use crate::Result;

/// SNEP client session over one connection.
pub struct SnepClient<T: Transport = LlcpSocket<Connected>> {
    messenger: SnepMessenger<T>,
    acceptable_length: u32,
}

impl SnepClient<LlcpSocket<Connected>> {
    /// Connect to the peer's SNEP server, by SAP when `config.sap` is set
    /// and by service name otherwise.
    pub fn connect(manager: &Arc<ConnectionManager>, config: &SnepConfig) -> Result<Self> {
        let target = match config.sap {
            Some(sap) => ServiceTarget::Sap(sap),
            None => ServiceTarget::Name(config.service_name.clone()),
        };
        let socket = LlcpSocket::create(manager, config.miu, config.rw)?.connect(target)?;
        let remote_miu = socket.remote_max_info_unit()?;
        Ok(Self::with_transport(socket, config, remote_miu))
    }
}

impl<T: Transport> SnepClient<T> {
    pub fn with_transport(transport: T, config: &SnepConfig, remote_miu: u16) -> Self {
        let fragment_length = config.fragment_length_for(remote_miu);
        Self {
            messenger: SnepMessenger::new(true, transport, fragment_length),
            acceptable_length: config.acceptable_length,
        }
    }

    /// Push `msg` to the peer. The response's information field is
    /// discarded; its field code is returned.
    pub fn put(&mut self, msg: NdefMessage) -> Result<u8> {
        self.messenger.send_message(&SnepMessage::put_request(msg))?;
        let response = self.messenger.get_message()?;
        debug!("snep client: put answered {}", field_name(response.field()));
        Ok(response.field())
    }

    /// Ask the peer for the message matching `request`.
    pub fn get(&mut self, request: NdefMessage) -> Result<SnepMessage> {
        self.messenger
            .send_message(&SnepMessage::get_request(self.acceptable_length, request))?;
        self.messenger.get_response(self.acceptable_length)
    }

    pub fn messenger(&self) -> &SnepMessenger<T> {
        &self.messenger
    }

    pub fn close(&mut self) -> Result<()> {
        self.messenger.close()
    }
}
