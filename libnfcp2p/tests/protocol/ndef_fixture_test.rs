#[path = "../common/mod.rs"]
mod common;

use libnfcp2p::Tnf;
use libnfcp2p::protocol::ndef::{self, NdefMessage, NdefRecord};

#[test]
fn uri_capture_decodes() {
    let msg = NdefMessage::parse(&common::fixtures::uri_record_bytes()).expect("parse");
    assert_eq!(msg.records().len(), 1);
    let record = &msg.records()[0];
    assert_eq!(record.tnf(), Tnf::WellKnown);
    assert_eq!(record.record_type(), b"U");
    assert_eq!(record.as_uri().as_deref(), Some("https://example.com"));
}

#[test]
fn uri_record_encodes_to_capture() {
    assert_eq!(
        common::fixtures::uri_message().to_bytes(),
        common::fixtures::uri_record_bytes()
    );
}

#[test]
fn chunked_capture_is_flattened() {
    let msg = NdefMessage::parse(&common::fixtures::chunked_mime_bytes()).expect("parse");
    assert_eq!(msg.records().len(), 1);
    let record = &msg.records()[0];
    assert_eq!(record.tnf(), Tnf::MimeMedia);
    assert_eq!(record.record_type(), b"text/plain");
    assert_eq!(record.payload(), b"abcdef");

    // re-encoding produces a single unchunked record
    let again = NdefMessage::parse(&msg.to_bytes()).expect("reparse");
    assert_eq!(again, msg);
    assert!(msg.byte_len() < common::fixtures::chunked_mime_bytes().len());
}

#[test]
fn empty_record_capture() {
    let msg = NdefMessage::parse(&common::fixtures::empty_record_bytes()).expect("parse");
    assert_eq!(msg.records(), &[NdefRecord::empty()]);
    assert_eq!(msg.to_bytes(), common::fixtures::empty_record_bytes());
}

#[test]
fn long_record_keeps_long_form() {
    let capture = common::fixtures::long_record_bytes();
    let msg = NdefMessage::parse(&capture).expect("parse");
    assert_eq!(msg.records()[0].tnf(), Tnf::Unknown);
    assert_eq!(msg.records()[0].payload().len(), 256);
    assert_eq!(msg.to_bytes(), capture);
}

#[test]
fn parse_single_record_at_offset() {
    let first = NdefRecord::uri("https://example.com").unwrap();
    let second = NdefRecord::text("fr", "bonjour").unwrap();
    let bytes = ndef::serialize(&[first.clone(), second.clone()]);

    let all = ndef::parse(&bytes, false, 0).expect("full parse");
    assert_eq!(all, vec![first.clone(), second.clone()]);

    // with markers ignored, exactly one record is read from the offset
    let offset = common::fixtures::uri_record_bytes().len();
    let tail = ndef::parse(&bytes, true, offset).expect("tail parse");
    assert_eq!(tail, vec![second.clone()]);
    assert_eq!(tail[0].as_text(), Some(("fr".to_string(), "bonjour".to_string())));

    let head = ndef::parse(&bytes, true, 0).expect("head parse");
    assert_eq!(head, vec![first]);
}

#[test]
fn well_known_helpers_roundtrip_through_wire() {
    let records = vec![
        NdefRecord::text("en", "hello").unwrap(),
        NdefRecord::mime("Text/VCard; charset=utf-8", b"BEGIN:VCARD").unwrap(),
        NdefRecord::external("example.com", "tag", &[1, 2, 3]).unwrap(),
    ];
    let msg = NdefMessage::new(records.clone()).unwrap();
    let parsed = NdefMessage::try_from(msg.to_bytes().as_slice()).unwrap();
    assert_eq!(parsed.records(), &records[..]);
    assert_eq!(parsed.records()[1].record_type(), b"text/vcard");
    assert_eq!(parsed.records()[2].record_type(), b"example.com:tag");
}
