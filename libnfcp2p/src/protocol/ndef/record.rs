// libnfcp2p/src/protocol/ndef/record.rs

use crate::error::FormatError;
use crate::types::Tnf;
use crate::utils::bytes_to_hex;
use crate::{Error, Result};

/// A single logical NDEF record.
///
/// Chunked records on the wire are flattened by the parser, so a record
/// always carries its full payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NdefRecord {
    tnf: Tnf,
    record_type: Vec<u8>,
    id: Vec<u8>,
    payload: Vec<u8>,
}

impl NdefRecord {
    /// Build a record, enforcing the TNF rules the parser applies.
    pub fn new(tnf: Tnf, record_type: Vec<u8>, id: Vec<u8>, payload: Vec<u8>) -> Result<Self> {
        validate_tnf(tnf, &record_type, &id, &payload)
            .map_err(|e| Error::InvalidRecord(e.to_string()))?;
        if record_type.len() > u8::MAX as usize || id.len() > u8::MAX as usize {
            return Err(Error::InvalidRecord(format!(
                "type ({}B) and id ({}B) must each fit in 255 bytes",
                record_type.len(),
                id.len()
            )));
        }
        if payload.len() as u64 > crate::constants::NDEF_MAX_PAYLOAD_SIZE {
            return Err(Error::InvalidRecord(
                FormatError::PayloadTooLarge {
                    len: payload.len() as u64,
                    max: crate::constants::NDEF_MAX_PAYLOAD_SIZE,
                }
                .to_string(),
            ));
        }
        Ok(Self::from_parts(tnf, record_type, id, payload))
    }

    /// The empty record (TNF_EMPTY, all fields empty).
    pub fn empty() -> Self {
        Self::from_parts(Tnf::Empty, Vec::new(), Vec::new(), Vec::new())
    }

    pub(crate) fn from_parts(
        tnf: Tnf,
        record_type: Vec<u8>,
        id: Vec<u8>,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            tnf,
            record_type,
            id,
            payload,
        }
    }

    pub fn tnf(&self) -> Tnf {
        self.tnf
    }

    pub fn record_type(&self) -> &[u8] {
        &self.record_type
    }

    pub fn id(&self) -> &[u8] {
        &self.id
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Short human-readable summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "tnf={:?} type={} id={} payload={}B",
            self.tnf,
            bytes_to_hex(&self.record_type),
            bytes_to_hex(&self.id),
            self.payload.len()
        )
    }
}

/// Check the field constraints of a complete logical record.
pub(crate) fn validate_tnf(
    tnf: Tnf,
    record_type: &[u8],
    id: &[u8],
    payload: &[u8],
) -> std::result::Result<(), FormatError> {
    match tnf {
        Tnf::Empty => {
            if !record_type.is_empty() || !id.is_empty() || !payload.is_empty() {
                return Err(FormatError::DataInEmptyRecord);
            }
            Ok(())
        }
        Tnf::WellKnown | Tnf::MimeMedia | Tnf::AbsoluteUri | Tnf::ExternalType => Ok(()),
        Tnf::Unknown | Tnf::Reserved => {
            if !record_type.is_empty() {
                return Err(FormatError::TypeInUntypedRecord);
            }
            Ok(())
        }
        Tnf::Unchanged => Err(FormatError::UnexpectedUnchanged),
    }
}
