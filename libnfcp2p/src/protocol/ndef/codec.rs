// libnfcp2p/src/protocol/ndef/codec.rs

//! Binary NDEF encode/decode.
//!
//! Record layout:
//! `[flags(1)] [type_len(1)] [payload_len(1|4 BE)] [id_len(1)?] [type] [id] [payload]`
//! where flags = MB | ME | CF | SR | IL | TNF(3).

use crate::constants::{
    NDEF_FLAG_CF, NDEF_FLAG_IL, NDEF_FLAG_MB, NDEF_FLAG_ME, NDEF_FLAG_SR, NDEF_MAX_PAYLOAD_SIZE,
    NDEF_SHORT_RECORD_LIMIT,
};
use crate::error::FormatError;
use crate::protocol::parser::Cursor;
use crate::types::Tnf;

use super::record::{NdefRecord, validate_tnf};

/// Buffered state of a chunked record while its continuation chunks arrive.
struct ChunkState {
    tnf: Tnf,
    record_type: Vec<u8>,
    id: Vec<u8>,
    payloads: Vec<Vec<u8>>,
    total: u64,
}

impl ChunkState {
    fn flatten(self) -> NdefRecord {
        let payload = self.payloads.concat();
        NdefRecord::from_parts(self.tnf, self.record_type, self.id, payload)
    }
}

fn ensure_sane_payload_size(len: u64) -> Result<(), FormatError> {
    if len > NDEF_MAX_PAYLOAD_SIZE {
        return Err(FormatError::PayloadTooLarge {
            len,
            max: NDEF_MAX_PAYLOAD_SIZE,
        });
    }
    Ok(())
}

/// Parse NDEF records from `buffer` starting at `offset`.
///
/// Reads until a record carries ME. With `ignore_markers` set, MB/ME
/// sequencing is not checked and parsing stops after exactly one logical
/// record.
pub fn parse(
    buffer: &[u8],
    ignore_markers: bool,
    offset: usize,
) -> Result<Vec<NdefRecord>, FormatError> {
    let mut cursor = Cursor::at(buffer, offset);
    parse_from(&mut cursor, ignore_markers)
}

/// Parse records from an existing cursor, leaving it positioned after the
/// last record read.
pub fn parse_from(
    cursor: &mut Cursor<'_>,
    ignore_markers: bool,
) -> Result<Vec<NdefRecord>, FormatError> {
    let mut records: Vec<NdefRecord> = Vec::new();
    let mut chunk: Option<ChunkState> = None;

    loop {
        let flags = cursor.read_u8()?;
        let mb = flags & NDEF_FLAG_MB != 0;
        let me = flags & NDEF_FLAG_ME != 0;
        let cf = flags & NDEF_FLAG_CF != 0;
        let sr = flags & NDEF_FLAG_SR != 0;
        let il = flags & NDEF_FLAG_IL != 0;
        let tnf = Tnf::from_bits(flags);
        let in_chunk = chunk.is_some();

        if !ignore_markers {
            if !mb && records.is_empty() && !in_chunk {
                return Err(FormatError::ExpectedBeginMarker);
            }
            if mb && (!records.is_empty() || in_chunk) {
                return Err(FormatError::UnexpectedBeginMarker);
            }
        }
        if in_chunk && il {
            return Err(FormatError::IdInContinuationChunk);
        }
        if cf && me {
            return Err(FormatError::EndMarkerInChunk);
        }
        if in_chunk && tnf != Tnf::Unchanged {
            return Err(FormatError::ExpectedUnchanged);
        }
        if !in_chunk && tnf == Tnf::Unchanged {
            return Err(FormatError::UnexpectedUnchanged);
        }

        let type_len = cursor.read_u8()? as usize;
        let payload_len = if sr {
            cursor.read_u8()? as u64
        } else {
            cursor.read_u32_be()? as u64
        };
        let id_len = if il { cursor.read_u8()? as usize } else { 0 };

        if in_chunk && type_len != 0 {
            return Err(FormatError::TypeInContinuationChunk);
        }

        let record_type = cursor.read_vec(type_len)?;
        let id = cursor.read_vec(id_len)?;

        // Checked against the declared length, before anything is copied
        ensure_sane_payload_size(payload_len)?;
        let payload = cursor.read_vec(payload_len as usize)?;

        let record = match chunk.take() {
            None if cf => {
                if type_len == 0 && tnf != Tnf::Unknown {
                    return Err(FormatError::MissingTypeInFirstChunk);
                }
                chunk = Some(ChunkState {
                    tnf,
                    record_type,
                    id,
                    payloads: vec![payload],
                    total: payload_len,
                });
                continue;
            }
            None => NdefRecord::from_parts(tnf, record_type, id, payload),
            Some(mut state) => {
                state.total += payload_len;
                ensure_sane_payload_size(state.total)?;
                state.payloads.push(payload);
                if cf {
                    chunk = Some(state);
                    continue;
                }
                state.flatten()
            }
        };

        validate_tnf(
            record.tnf(),
            record.record_type(),
            record.id(),
            record.payload(),
        )?;
        records.push(record);

        if ignore_markers || me {
            break;
        }
    }

    Ok(records)
}

/// Encoded size of a single record.
pub fn record_len(record: &NdefRecord) -> usize {
    let sr = record.payload().len() < NDEF_SHORT_RECORD_LIMIT;
    let il = !record.id().is_empty();
    3 + record.record_type().len()
        + record.id().len()
        + record.payload().len()
        + if sr { 0 } else { 3 }
        + if il { 1 } else { 0 }
}

/// Append one record with the given begin/end markers.
pub fn write_record(out: &mut Vec<u8>, record: &NdefRecord, mb: bool, me: bool) {
    let sr = record.payload().len() < NDEF_SHORT_RECORD_LIMIT;
    let il = !record.id().is_empty();

    let mut flags = record.tnf().as_u8();
    if mb {
        flags |= NDEF_FLAG_MB;
    }
    if me {
        flags |= NDEF_FLAG_ME;
    }
    if sr {
        flags |= NDEF_FLAG_SR;
    }
    if il {
        flags |= NDEF_FLAG_IL;
    }

    out.push(flags);
    out.push(record.record_type().len() as u8);
    if sr {
        out.push(record.payload().len() as u8);
    } else {
        out.extend_from_slice(&(record.payload().len() as u32).to_be_bytes());
    }
    if il {
        out.push(record.id().len() as u8);
    }
    out.extend_from_slice(record.record_type());
    out.extend_from_slice(record.id());
    out.extend_from_slice(record.payload());
}

/// Serialize records as one NDEF message. Output is never chunked.
pub fn serialize(records: &[NdefRecord]) -> Vec<u8> {
    let total = records.iter().map(record_len).sum::<usize>();
    let mut out = Vec::with_capacity(total);
    let last = records.len().saturating_sub(1);
    for (i, record) in records.iter().enumerate() {
        write_record(&mut out, record, i == 0, i == last);
    }
    out
}
