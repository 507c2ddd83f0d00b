// libnfcp2p/src/types.rs

use derive_more::{Display, From};

/// Process-local connection handle handed out by the connection manager.
///
/// Independent of the link-layer session handle, which is bound to a
/// connection asynchronously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[display(fmt = "#{}", _0)]
pub struct Handle(u32);

impl Handle {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Handle assigned by the link layer for a registration or a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[display(fmt = "{:#06x}", _0)]
pub struct HwHandle(u16);

impl HwHandle {
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

/// Type Name Format: the 3-bit namespace of an NDEF record's type field.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tnf {
    Empty = 0x00,
    WellKnown = 0x01,
    MimeMedia = 0x02,
    AbsoluteUri = 0x03,
    ExternalType = 0x04,
    Unknown = 0x05,
    Unchanged = 0x06,
    Reserved = 0x07,
}

impl Tnf {
    /// Decode the low three bits of an NDEF header byte.
    pub fn from_bits(bits: u8) -> Self {
        match bits & crate::constants::NDEF_TNF_MASK {
            0x00 => Self::Empty,
            0x01 => Self::WellKnown,
            0x02 => Self::MimeMedia,
            0x03 => Self::AbsoluteUri,
            0x04 => Self::ExternalType,
            0x05 => Self::Unknown,
            0x06 => Self::Unchanged,
            _ => Self::Reserved,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// Where a client connects: a service name or a raw service access point.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ServiceTarget {
    #[display(fmt = "{}", _0)]
    Name(String),
    #[display(fmt = "sap {}", _0)]
    Sap(u8),
}

impl From<&str> for ServiceTarget {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<u8> for ServiceTarget {
    fn from(sap: u8) -> Self {
        Self::Sap(sap)
    }
}
