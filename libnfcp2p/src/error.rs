// libnfcp2p/src/error.rs

use thiserror::Error;

use crate::types::Handle;

/// Decode failures for NDEF and SNEP byte streams.
///
/// Every variant is local and non-retryable: the bytes are wrong and
/// reading them again will not help.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("truncated input: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("expected MB flag on first record")]
    ExpectedBeginMarker,
    #[error("unexpected MB flag after first record")]
    UnexpectedBeginMarker,
    #[error("unexpected IL flag in non-leading chunk")]
    IdInContinuationChunk,
    #[error("unexpected ME flag in non-trailing chunk")]
    EndMarkerInChunk,
    #[error("expected TNF_UNCHANGED in non-leading chunk")]
    ExpectedUnchanged,
    #[error("unexpected TNF_UNCHANGED in first chunk or unchunked record")]
    UnexpectedUnchanged,
    #[error("expected zero-length type in non-leading chunk")]
    TypeInContinuationChunk,
    #[error("expected non-zero type length in first chunk")]
    MissingTypeInFirstChunk,
    #[error("unexpected data in TNF_EMPTY record")]
    DataInEmptyRecord,
    #[error("unexpected type field in TNF_UNKNOWN or TNF_RESERVED record")]
    TypeInUntypedRecord,
    #[error("payload above max limit: {len} > {max}")]
    PayloadTooLarge { len: u64, max: u64 },
    #[error("ndef message contains no records")]
    EmptyMessage,

    #[error("invalid snep information field length {length}")]
    InvalidSnepLength { length: u32 },
}

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("link primitive failed: {0}")]
    LinkFailure(String),

    #[error("link closed")]
    LinkClosed,

    #[error("no link layer configured")]
    LinkUnavailable,

    #[error("operation timed out")]
    Timeout,

    #[error("resource exhausted: {0}")]
    ResourceExhausted(&'static str),

    #[error("unknown handle {0}")]
    UnknownHandle(Handle),

    #[error("unexpected response field: expected {expected:#04x}, got {actual:#04x}")]
    UnexpectedResponse { expected: u8, actual: u8 },

    /// The message was already refused on the wire; no further reply is due.
    #[error("rejected incoming message: {0}")]
    Rejected(#[source] FormatError),
}

impl Error {
    /// Link failures, closed sessions and timeouts are handled alike by
    /// callers: the operation failed and the connection is gone.
    pub fn is_link_error(&self) -> bool {
        matches!(
            self,
            Error::LinkFailure(_) | Error::LinkClosed | Error::Timeout
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_display() {
        let err = FormatError::Truncated {
            needed: 4,
            available: 1,
        };
        let s = format!("{}", err);
        assert!(s.contains("needed 4"));
        assert!(s.contains("1 available"));
    }

    #[test]
    fn format_error_wraps_into_error() {
        let err: Error = FormatError::ExpectedBeginMarker.into();
        assert!(matches!(err, Error::Format(FormatError::ExpectedBeginMarker)));
        assert!(format!("{}", err).contains("MB flag"));
    }

    #[test]
    fn unexpected_response_display() {
        let err = Error::UnexpectedResponse {
            expected: 0x80,
            actual: 0xff,
        };
        let s = format!("{}", err);
        assert!(s.contains("expected 0x80"));
        assert!(s.contains("got 0xff"));
    }

    #[test]
    fn link_error_grouping() {
        assert!(Error::LinkClosed.is_link_error());
        assert!(Error::Timeout.is_link_error());
        assert!(Error::LinkFailure("status 3".into()).is_link_error());
        assert!(!Error::ResourceExhausted("server slots").is_link_error());
        assert!(!Error::Format(FormatError::EmptyMessage).is_link_error());
        assert!(!Error::Rejected(FormatError::EmptyMessage).is_link_error());
    }
}
