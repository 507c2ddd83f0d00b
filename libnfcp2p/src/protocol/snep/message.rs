// libnfcp2p/src/protocol/snep/message.rs

use crate::constants::*;
use crate::error::FormatError;
use crate::protocol::ndef::NdefMessage;
use crate::protocol::parser::Cursor;
use crate::Result;

/// One SNEP request or response.
///
/// Wire format: `[version(1)] [field(1)] [length(4 BE)] [acceptable_length(4 BE)]? [ndef]`
/// where `acceptable_length` is present only on GET requests and is
/// counted inside `length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnepMessage {
    version: u8,
    field: u8,
    length: u32,
    acceptable_length: Option<u32>,
    ndef: Option<NdefMessage>,
}

impl SnepMessage {
    fn with_ndef(field: u8, ndef: Option<NdefMessage>) -> Self {
        let length = ndef.as_ref().map_or(0, |m| m.byte_len() as u32);
        Self {
            version: SNEP_VERSION,
            field,
            length,
            acceptable_length: None,
            ndef,
        }
    }

    pub fn put_request(ndef: NdefMessage) -> Self {
        Self::with_ndef(SNEP_REQUEST_PUT, Some(ndef))
    }

    pub fn get_request(acceptable_length: u32, ndef: NdefMessage) -> Self {
        let length = (SNEP_ACCEPTABLE_LENGTH_LEN + ndef.byte_len()) as u32;
        Self {
            version: SNEP_VERSION,
            field: SNEP_REQUEST_GET,
            length,
            acceptable_length: Some(acceptable_length),
            ndef: Some(ndef),
        }
    }

    /// A message with an empty information field.
    pub fn response(field: u8) -> Self {
        Self::with_ndef(field, None)
    }

    pub fn success_response(ndef: Option<NdefMessage>) -> Self {
        Self::with_ndef(SNEP_RESPONSE_SUCCESS, ndef)
    }

    /// Header-only message carrying an arbitrary version, as produced by
    /// the receive path when the peer speaks an incompatible major version.
    pub(crate) fn version_mismatch(version: u8, field: u8) -> Self {
        Self {
            version,
            field,
            length: 0,
            acceptable_length: None,
            ndef: None,
        }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn major_version(&self) -> u8 {
        (self.version & 0xf0) >> 4
    }

    pub fn field(&self) -> u8 {
        self.field
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn acceptable_length(&self) -> Option<u32> {
        self.acceptable_length
    }

    pub fn ndef(&self) -> Option<&NdefMessage> {
        self.ndef.as_ref()
    }

    pub fn into_ndef(self) -> Option<NdefMessage> {
        self.ndef
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let ndef = self.ndef.as_ref().map(NdefMessage::to_bytes);
        let mut out = Vec::with_capacity(
            SNEP_HEADER_LEN
                + SNEP_ACCEPTABLE_LENGTH_LEN
                + ndef.as_ref().map_or(0, Vec::len),
        );
        out.push(self.version);
        out.push(self.field);
        out.extend_from_slice(&self.length.to_be_bytes());
        if self.field == SNEP_REQUEST_GET {
            out.extend_from_slice(&self.acceptable_length.unwrap_or(0).to_be_bytes());
        }
        if let Some(ndef) = ndef {
            out.extend_from_slice(&ndef);
        }
        out
    }

    /// Decode a complete message (header plus the whole information field).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let version = cursor.read_u8()?;
        let field = cursor.read_u8()?;
        let length = cursor.read_u32_be()?;

        let mut info_len = length as usize;
        let acceptable_length = if field == SNEP_REQUEST_GET {
            if info_len < SNEP_ACCEPTABLE_LENGTH_LEN {
                return Err(FormatError::InvalidSnepLength { length }.into());
            }
            info_len -= SNEP_ACCEPTABLE_LENGTH_LEN;
            Some(cursor.read_u32_be()?)
        } else {
            None
        };

        let ndef = if info_len > 0 {
            let bytes = cursor.read_slice(info_len)?;
            Some(NdefMessage::parse(bytes)?)
        } else {
            None
        };

        Ok(Self {
            version,
            field,
            length,
            acceptable_length,
            ndef,
        })
    }
}

/// Mnemonic for a field value, for logs.
pub fn field_name(field: u8) -> &'static str {
    match field {
        SNEP_REQUEST_CONTINUE => "REQUEST_CONTINUE",
        SNEP_REQUEST_GET => "REQUEST_GET",
        SNEP_REQUEST_PUT => "REQUEST_PUT",
        SNEP_REQUEST_REJECT => "REQUEST_REJECT",
        SNEP_RESPONSE_CONTINUE => "RESPONSE_CONTINUE",
        SNEP_RESPONSE_SUCCESS => "RESPONSE_SUCCESS",
        SNEP_RESPONSE_NOT_FOUND => "RESPONSE_NOT_FOUND",
        SNEP_RESPONSE_EXCESS_DATA => "RESPONSE_EXCESS_DATA",
        SNEP_RESPONSE_BAD_REQUEST => "RESPONSE_BAD_REQUEST",
        SNEP_RESPONSE_NOT_IMPLEMENTED => "RESPONSE_NOT_IMPLEMENTED",
        SNEP_RESPONSE_UNSUPPORTED_VERSION => "RESPONSE_UNSUPPORTED_VERSION",
        SNEP_RESPONSE_REJECT => "RESPONSE_REJECT",
        _ => "UNKNOWN",
    }
}
