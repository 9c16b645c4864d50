// src/decode/cursor.rs

use thiserror::Error;

/// Attempted to read past the end of a [`ByteCursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("wanted {wanted} bytes, {remaining} remaining")]
pub struct Underflow {
    pub wanted: usize,
    pub remaining: usize,
}

/// Forward-only reader over a borrowed byte slice.
///
/// Every read names its width and is checked against the slice length before
/// any byte is touched. Integers are decoded in native byte order, which is
/// how the kernel writes fanotify records.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], Underflow> {
        let underflow = Underflow {
            wanted: n,
            remaining: self.remaining(),
        };
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.buf.len())
            .ok_or(underflow)?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Skip `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<(), Underflow> {
        self.take(n).map(|_| ())
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], Underflow> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, Underflow> {
        Ok(u8::from_ne_bytes(self.array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16, Underflow> {
        Ok(u16::from_ne_bytes(self.array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, Underflow> {
        Ok(u32::from_ne_bytes(self.array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, Underflow> {
        Ok(i32::from_ne_bytes(self.array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, Underflow> {
        Ok(u64::from_ne_bytes(self.array()?))
    }
}
