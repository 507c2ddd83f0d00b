// libnfcp2p/src/protocol/snep/messenger.rs

use log::{debug, warn};

use crate::constants::{
    NDEF_MAX_PAYLOAD_SIZE, SNEP_ACCEPTABLE_LENGTH_LEN, SNEP_HEADER_LEN, SNEP_REQUEST_CONTINUE,
    SNEP_REQUEST_REJECT, SNEP_RESPONSE_CONTINUE, SNEP_RESPONSE_REJECT, SNEP_VERSION_MAJOR,
};
use crate::error::FormatError;
use crate::protocol::parser::Cursor;
use crate::transport::Transport;
use crate::{Error, Result};

use super::message::{SnepMessage, field_name};

/// Largest information field accepted from a peer: one maximal NDEF
/// payload plus a GET request's acceptable-length prefix.
pub const MAX_INFO_LENGTH: u64 = NDEF_MAX_PAYLOAD_SIZE + SNEP_ACCEPTABLE_LENGTH_LEN as u64;

/// Fragmenting SNEP sender/receiver over a byte-oriented connection.
///
/// The same type serves both ends; `is_client` selects which CONTINUE
/// and REJECT opcodes it sends and expects.
pub struct SnepMessenger<T: Transport> {
    transport: T,
    is_client: bool,
    fragment_length: usize,
}

impl<T: Transport> SnepMessenger<T> {
    /// `fragment_length` is clamped so the first fragment always holds a
    /// complete header.
    pub fn new(is_client: bool, transport: T, fragment_length: usize) -> Self {
        Self {
            transport,
            is_client,
            fragment_length: fragment_length.max(SNEP_HEADER_LEN),
        }
    }

    pub fn fragment_length(&self) -> usize {
        self.fragment_length
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// CONTINUE the peer must answer our first fragment with
    fn remote_continue(&self) -> u8 {
        if self.is_client {
            SNEP_RESPONSE_CONTINUE
        } else {
            SNEP_REQUEST_CONTINUE
        }
    }

    /// CONTINUE we answer the peer's first fragment with
    fn local_continue(&self) -> u8 {
        if self.is_client {
            SNEP_REQUEST_CONTINUE
        } else {
            SNEP_RESPONSE_CONTINUE
        }
    }

    fn local_reject(&self) -> u8 {
        if self.is_client {
            SNEP_REQUEST_REJECT
        } else {
            SNEP_RESPONSE_REJECT
        }
    }

    fn send_reject(&mut self) {
        let reject = SnepMessage::response(self.local_reject()).to_bytes();
        if let Err(e) = self.transport.send(&reject) {
            debug!("snep: could not send reject: {}", e);
        }
    }

    /// Send `msg`, fragmenting when it exceeds the fragment length.
    ///
    /// Fragments after the first are sent only once the peer answers with
    /// CONTINUE; any other answer aborts the exchange.
    pub fn send_message(&mut self, msg: &SnepMessage) -> Result<()> {
        let buffer = msg.to_bytes();
        let first = buffer.len().min(self.fragment_length);
        self.transport.send(&buffer[..first])?;
        if first == buffer.len() {
            return Ok(());
        }

        let reply = self.transport.receive()?;
        let reply = SnepMessage::from_bytes(&reply)?;
        let expected = self.remote_continue();
        if reply.field() != expected {
            warn!(
                "snep: peer answered first fragment with {}",
                field_name(reply.field())
            );
            return Err(Error::UnexpectedResponse {
                expected,
                actual: reply.field(),
            });
        }

        let mut offset = first;
        while offset < buffer.len() {
            let len = (buffer.len() - offset).min(self.fragment_length);
            self.transport.send(&buffer[offset..offset + len])?;
            offset += len;
        }
        debug!(
            "snep: sent {} in {} fragments",
            field_name(msg.field()),
            buffer.len().div_ceil(self.fragment_length)
        );
        Ok(())
    }

    /// Receive one complete message, acknowledging fragmented ones.
    ///
    /// A message whose major version differs from ours comes back header
    /// only, without reading its information field. Messages refused on
    /// the wire (short header, oversized information field) fail with
    /// [`Error::Rejected`].
    pub fn get_message(&mut self) -> Result<SnepMessage> {
        self.receive_bounded(MAX_INFO_LENGTH)
    }

    /// Receive the answer to a GET, refusing information fields larger
    /// than the `acceptable_length` the request carried.
    pub fn get_response(&mut self, acceptable_length: u32) -> Result<SnepMessage> {
        self.receive_bounded(MAX_INFO_LENGTH.min(acceptable_length as u64))
    }

    fn receive_bounded(&mut self, max_info_length: u64) -> Result<SnepMessage> {
        let mut buffer = match self.transport.receive() {
            Ok(chunk) => chunk,
            Err(e) => {
                self.send_reject();
                return Err(e);
            }
        };
        if buffer.len() < SNEP_HEADER_LEN {
            self.send_reject();
            return Err(Error::Rejected(FormatError::Truncated {
                needed: SNEP_HEADER_LEN,
                available: buffer.len(),
            }));
        }

        let mut header = Cursor::new(&buffer);
        let version = header.read_u8()?;
        let field = header.read_u8()?;
        let length = header.read_u32_be()? as usize;

        if (version & 0xf0) >> 4 != SNEP_VERSION_MAJOR {
            debug!("snep: unsupported version {:#04x}", version);
            return Ok(SnepMessage::version_mismatch(version, field));
        }

        if length as u64 > max_info_length {
            warn!(
                "snep: peer declared {} bytes, refusing above {}",
                length, max_info_length
            );
            self.send_reject();
            return Err(Error::Rejected(FormatError::PayloadTooLarge {
                len: length as u64,
                max: max_info_length,
            }));
        }

        let mut read = buffer.len() - SNEP_HEADER_LEN;
        if length > read {
            let cont = SnepMessage::response(self.local_continue()).to_bytes();
            self.transport.send(&cont)?;
        }
        while length > read {
            match self.transport.receive() {
                Ok(chunk) => {
                    read += chunk.len();
                    buffer.extend_from_slice(&chunk);
                }
                Err(e) => {
                    self.send_reject();
                    return Err(e);
                }
            }
        }

        SnepMessage::from_bytes(&buffer)
    }

    pub fn close(&mut self) -> Result<()> {
        self.transport.close()
    }
}
