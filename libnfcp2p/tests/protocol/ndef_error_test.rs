#[path = "../common/mod.rs"]
mod common;

use libnfcp2p::protocol::ndef::{self, NdefMessage};
use libnfcp2p::{Error, FormatError};

fn parse_err(capture: &str) -> FormatError {
    ndef::parse(&common::fixtures::bytes(capture), false, 0).expect_err("should not parse")
}

#[test]
fn first_record_needs_begin_marker() {
    assert_eq!(parse_err("51 01 00 54"), FormatError::ExpectedBeginMarker);
}

#[test]
fn second_begin_marker_rejected() {
    assert_eq!(
        parse_err("91 01 00 54 d1 01 00 54"),
        FormatError::UnexpectedBeginMarker
    );
}

#[test]
fn unchanged_outside_chunk_rejected() {
    assert_eq!(parse_err("d6 00 00"), FormatError::UnexpectedUnchanged);
}

#[test]
fn chunk_continuation_must_be_unchanged() {
    // second chunk claims TNF_WELL_KNOWN
    assert_eq!(
        parse_err("b2 01 01 78 61 51 00 01 62"),
        FormatError::ExpectedUnchanged
    );
}

#[test]
fn empty_record_with_payload_rejected() {
    assert_eq!(parse_err("d0 00 01 01"), FormatError::DataInEmptyRecord);
}

#[test]
fn truncated_capture() {
    assert!(matches!(
        parse_err("d1 01 0c 55 04 65"),
        FormatError::Truncated { .. }
    ));
}

#[test]
fn oversized_payload_rejected_before_allocation() {
    // long-form record declaring a 0x7fffffff byte payload
    assert!(matches!(
        parse_err("c5 00 7f ff ff ff"),
        FormatError::PayloadTooLarge { .. }
    ));
}

#[test]
fn message_level_errors_wrap_format_errors() {
    match NdefMessage::parse(&[]) {
        Err(Error::Format(FormatError::Truncated { .. })) => {}
        other => panic!("unexpected: {:?}", other),
    }
}
