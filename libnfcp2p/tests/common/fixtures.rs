// fixtures.rs: wire captures and sample messages shared across tests

use libnfcp2p::protocol::ndef::{NdefMessage, NdefRecord};

/// Decode a hex capture, ignoring whitespace.
pub fn bytes(capture: &str) -> Vec<u8> {
    let compact: String = capture.split_whitespace().collect();
    hex::decode(compact).expect("fixture hex")
}

/// Single short URI record for `https://example.com`
pub fn uri_record_bytes() -> Vec<u8> {
    bytes("d1 01 0c 55 04 65 78 61 6d 70 6c 65 2e 63 6f 6d")
}

/// `text/plain` record split into three chunks: "abc" + "de" + "f"
pub fn chunked_mime_bytes() -> Vec<u8> {
    bytes(
        "b2 0a 03 74 65 78 74 2f 70 6c 61 69 6e 61 62 63 \
         36 00 02 64 65 \
         56 00 01 66",
    )
}

/// A lone TNF_EMPTY record
pub fn empty_record_bytes() -> Vec<u8> {
    bytes("d0 00 00")
}

/// Unknown-TNF long-form record with a 256 byte payload
pub fn long_record_bytes() -> Vec<u8> {
    let mut out = bytes("c5 00 00 00 01 00");
    out.extend((0..256u16).map(|i| i as u8));
    out
}

pub fn uri_message() -> NdefMessage {
    NdefMessage::from_record(NdefRecord::uri("https://example.com").expect("uri record"))
}

pub fn text_message(text: &str) -> NdefMessage {
    NdefMessage::from_record(NdefRecord::text("en", text).expect("text record"))
}

/// Message large enough to need several fragments at the default MIUs.
pub fn bulky_message(len: usize) -> NdefMessage {
    let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    NdefMessage::from_record(
        NdefRecord::mime("application/octet-stream", &data).expect("mime record"),
    )
}
