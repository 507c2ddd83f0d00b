// libnfcp2p/src/protocol/ndef/well_known.rs

//! Constructors and accessors for common NFC Forum record types.

use crate::types::Tnf;
use crate::{Error, Result};

use super::record::NdefRecord;

pub const RTD_TEXT: &[u8] = b"T";
pub const RTD_URI: &[u8] = b"U";
pub const RTD_SMART_POSTER: &[u8] = b"Sp";
pub const RTD_HANDOVER_REQUEST: &[u8] = b"Hr";
pub const RTD_HANDOVER_SELECT: &[u8] = b"Hs";

/// URI identifier codes, indexed by the first payload byte of a URI record.
pub const URI_PREFIXES: [&str; 36] = [
    "",
    "http://www.",
    "https://www.",
    "http://",
    "https://",
    "tel:",
    "mailto:",
    "ftp://anonymous:anonymous@",
    "ftp://ftp.",
    "ftps://",
    "sftp://",
    "smb://",
    "nfs://",
    "ftp://",
    "dav://",
    "news:",
    "telnet://",
    "imap:",
    "rtsp://",
    "urn:",
    "pop:",
    "sip:",
    "sips:",
    "tftp:",
    "btspp://",
    "btl2cap://",
    "btgoep://",
    "tcpobex://",
    "irdaobex://",
    "file://",
    "urn:epc:id:",
    "urn:epc:tag:",
    "urn:epc:pat:",
    "urn:epc:raw:",
    "urn:epc:",
    "urn:nfc:",
];

const TEXT_UTF16_FLAG: u8 = 0x80;
const TEXT_LANG_MASK: u8 = 0x3f;

impl NdefRecord {
    /// URI record with the longest matching prefix abbreviated.
    pub fn uri(uri: &str) -> Result<Self> {
        if uri.is_empty() {
            return Err(Error::InvalidRecord("uri is empty".into()));
        }
        let (code, prefix) = URI_PREFIXES
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, p)| uri.starts_with(*p))
            .max_by_key(|(_, p)| p.len())
            .map(|(i, p)| (i as u8, p.len()))
            .unwrap_or((0, 0));

        let mut payload = Vec::with_capacity(1 + uri.len() - prefix);
        payload.push(code);
        payload.extend_from_slice(uri[prefix..].as_bytes());
        Self::new(Tnf::WellKnown, RTD_URI.to_vec(), Vec::new(), payload)
    }

    /// UTF-8 text record tagged with an IANA language code.
    pub fn text(language: &str, text: &str) -> Result<Self> {
        let lang = language.as_bytes();
        if lang.len() > TEXT_LANG_MASK as usize {
            return Err(Error::InvalidRecord(format!(
                "language code too long: {}",
                language
            )));
        }
        let mut payload = Vec::with_capacity(1 + lang.len() + text.len());
        payload.push(lang.len() as u8);
        payload.extend_from_slice(lang);
        payload.extend_from_slice(text.as_bytes());
        Self::new(Tnf::WellKnown, RTD_TEXT.to_vec(), Vec::new(), payload)
    }

    /// MIME record; the type is lower-cased and stripped of parameters.
    pub fn mime(mime_type: &str, data: &[u8]) -> Result<Self> {
        let normalized = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if normalized.is_empty() || normalized.starts_with('/') || normalized.ends_with('/') {
            return Err(Error::InvalidRecord(format!(
                "invalid mime type: {:?}",
                mime_type
            )));
        }
        Self::new(
            Tnf::MimeMedia,
            normalized.into_bytes(),
            Vec::new(),
            data.to_vec(),
        )
    }

    /// NFC Forum external type record, `domain:type`.
    pub fn external(domain: &str, kind: &str, data: &[u8]) -> Result<Self> {
        let domain = domain.trim().to_ascii_lowercase();
        let kind = kind.trim().to_ascii_lowercase();
        if domain.is_empty() || kind.is_empty() {
            return Err(Error::InvalidRecord("external type needs domain and type".into()));
        }
        Self::new(
            Tnf::ExternalType,
            format!("{}:{}", domain, kind).into_bytes(),
            Vec::new(),
            data.to_vec(),
        )
    }

    /// Full URI carried by a URI or absolute-URI record.
    pub fn as_uri(&self) -> Option<String> {
        match self.tnf() {
            Tnf::WellKnown if self.record_type() == RTD_URI => {
                let (&code, rest) = self.payload().split_first()?;
                let prefix = URI_PREFIXES.get(code as usize).copied().unwrap_or("");
                let rest = std::str::from_utf8(rest).ok()?;
                Some(format!("{}{}", prefix, rest))
            }
            Tnf::AbsoluteUri => String::from_utf8(self.record_type().to_vec()).ok(),
            _ => None,
        }
    }

    /// `(language, text)` of a text record.
    pub fn as_text(&self) -> Option<(String, String)> {
        if self.tnf() != Tnf::WellKnown || self.record_type() != RTD_TEXT {
            return None;
        }
        let (&status, rest) = self.payload().split_first()?;
        let lang_len = (status & TEXT_LANG_MASK) as usize;
        if rest.len() < lang_len {
            return None;
        }
        let (lang, body) = rest.split_at(lang_len);
        let lang = std::str::from_utf8(lang).ok()?.to_string();
        let text = if status & TEXT_UTF16_FLAG != 0 {
            if body.len() % 2 != 0 {
                return None;
            }
            let units: Vec<u16> = body
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            String::from_utf16(&units).ok()?
        } else {
            std::str::from_utf8(body).ok()?.to_string()
        };
        Some((lang, text))
    }
}
