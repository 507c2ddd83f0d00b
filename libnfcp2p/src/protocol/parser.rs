// libnfcp2p/src/protocol/parser.rs

use crate::error::FormatError;

/// Bounds-checked reader over a borrowed byte slice.
///
/// Every read either advances the cursor or fails with
/// [`FormatError::Truncated`]; the cursor never panics on short input.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Start reading at `offset`. An offset past the end yields an empty
    /// cursor whose first read fails.
    pub fn at(data: &'a [u8], offset: usize) -> Self {
        Self {
            data,
            pos: offset.min(data.len()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fail unless at least `n` bytes remain.
    pub fn ensure(&self, n: usize) -> Result<(), FormatError> {
        if self.remaining() < n {
            return Err(FormatError::Truncated {
                needed: n,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, FormatError> {
        self.ensure(1)?;
        let b = self.data[self.pos];
        self.pos += 1;
        Ok(b)
    }

    pub fn read_u32_be(&mut self) -> Result<u32, FormatError> {
        let s = self.read_slice(4)?;
        Ok(u32::from_be_bytes([s[0], s[1], s[2], s[3]]))
    }

    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        self.ensure(len)?;
        let s = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(s)
    }

    /// Copy `len` bytes out; zero-length reads allocate nothing.
    pub fn read_vec(&mut self, len: usize) -> Result<Vec<u8>, FormatError> {
        if len == 0 {
            return Ok(Vec::new());
        }
        self.read_slice(len).map(<[u8]>::to_vec)
    }
}
