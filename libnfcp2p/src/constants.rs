// libnfcp2p/src/constants.rs
//! Common protocol constants used across the crate

// NDEF record header flags
pub const NDEF_FLAG_MB: u8 = 0x80;
pub const NDEF_FLAG_ME: u8 = 0x40;
pub const NDEF_FLAG_CF: u8 = 0x20;
pub const NDEF_FLAG_SR: u8 = 0x10;
pub const NDEF_FLAG_IL: u8 = 0x08;
pub const NDEF_TNF_MASK: u8 = 0x07;

/// Largest payload a single (possibly flattened) NDEF record may carry: 10 MiB
pub const NDEF_MAX_PAYLOAD_SIZE: u64 = 10 * (1 << 20);

/// Payloads shorter than this are written as short records
pub const NDEF_SHORT_RECORD_LIMIT: usize = 256;

/// SNEP version 1.0; only the major nibble takes part in compatibility checks
pub const SNEP_VERSION_MAJOR: u8 = 0x1;
pub const SNEP_VERSION_MINOR: u8 = 0x0;
pub const SNEP_VERSION: u8 = (SNEP_VERSION_MAJOR << 4) | SNEP_VERSION_MINOR;

/// version(1) + field(1) + length(4)
pub const SNEP_HEADER_LEN: usize = 6;
/// Size of the acceptable-length prefix carried by GET requests
pub const SNEP_ACCEPTABLE_LENGTH_LEN: usize = 4;

// SNEP request fields
pub const SNEP_REQUEST_CONTINUE: u8 = 0x00;
pub const SNEP_REQUEST_GET: u8 = 0x01;
pub const SNEP_REQUEST_PUT: u8 = 0x02;
pub const SNEP_REQUEST_REJECT: u8 = 0x07;

// SNEP response fields
pub const SNEP_RESPONSE_CONTINUE: u8 = 0x80;
pub const SNEP_RESPONSE_SUCCESS: u8 = 0x81;
pub const SNEP_RESPONSE_NOT_FOUND: u8 = 0xC0;
pub const SNEP_RESPONSE_EXCESS_DATA: u8 = 0xC1;
pub const SNEP_RESPONSE_BAD_REQUEST: u8 = 0xC2;
pub const SNEP_RESPONSE_NOT_IMPLEMENTED: u8 = 0xE0;
pub const SNEP_RESPONSE_UNSUPPORTED_VERSION: u8 = 0xE1;
pub const SNEP_RESPONSE_REJECT: u8 = 0xFF;

/// Well-known SNEP service name and service access point
pub const SNEP_SERVICE_NAME: &str = "urn:nfc:sn:snep";
pub const SNEP_DEFAULT_SAP: u8 = 0x04;

pub const SNEP_CLIENT_DEFAULT_MIU: u16 = 128;
pub const SNEP_SERVER_DEFAULT_MIU: u16 = 248;
pub const SNEP_DEFAULT_RW: u8 = 1;
pub const SNEP_DEFAULT_ACCEPTABLE_LENGTH: u32 = 100 * 1024;

/// LLCP default link MIU when the peer advertises nothing larger
pub const LLCP_DEFAULT_MIU: u16 = 128;

/// Concurrent peers a single registered server accepts
pub const MAX_CONNECTIONS_PER_SERVER: usize = 5;

// Listen technology bits handed to the link layer
pub const LISTEN_TECH_A: u32 = 0x01;
pub const LISTEN_TECH_F: u32 = 0x04;
pub const LISTEN_TECH_A_ACTIVE: u32 = 0x40;
pub const LISTEN_TECH_F_ACTIVE: u32 = 0x80;
pub const LISTEN_TECH_P2P_DEFAULT: u32 =
    LISTEN_TECH_A | LISTEN_TECH_F | LISTEN_TECH_A_ACTIVE | LISTEN_TECH_F_ACTIVE;
