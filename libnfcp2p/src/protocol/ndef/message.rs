// libnfcp2p/src/protocol/ndef/message.rs

use crate::error::FormatError;
use crate::{Error, Result};

use super::codec;
use super::record::NdefRecord;

/// An ordered, non-empty sequence of NDEF records.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NdefMessage {
    records: Vec<NdefRecord>,
}

impl NdefMessage {
    pub fn new(records: Vec<NdefRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::Format(FormatError::EmptyMessage));
        }
        Ok(Self { records })
    }

    pub fn from_record(record: NdefRecord) -> Self {
        Self {
            records: vec![record],
        }
    }

    /// Decode a complete message (MB/ME sequencing enforced).
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let records = codec::parse(bytes, false, 0)?;
        Self::new(records)
    }

    pub fn records(&self) -> &[NdefRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<NdefRecord> {
        self.records
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        codec::serialize(&self.records)
    }

    /// Length of [`to_bytes`](Self::to_bytes) without encoding.
    pub fn byte_len(&self) -> usize {
        self.records.iter().map(codec::record_len).sum()
    }
}

impl TryFrom<&[u8]> for NdefMessage {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::parse(bytes)
    }
}

impl From<NdefRecord> for NdefMessage {
    fn from(record: NdefRecord) -> Self {
        Self::from_record(record)
    }
}
