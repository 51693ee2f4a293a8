//! Zero-copy byte cursor for binary parsing

use crate::error::FormatError;
use bytes::{Buf, Bytes};

/// Cursor over a shared byte buffer.
///
/// `take` hands out slices of the underlying buffer without copying;
/// positions in errors are absolute (offset by `base`) so they point into
/// the whole file.
#[derive(Debug, Clone)]
pub struct ByteCursor {
    data: Bytes,
    base: usize,
    consumed: usize,
}

impl ByteCursor {
    pub fn new(data: Bytes) -> Self {
        Self::with_base(data, 0)
    }

    /// Cursor whose first byte sits at `base` in the enclosing file
    pub fn with_base(data: Bytes, base: usize) -> Self {
        Self {
            data,
            base,
            consumed: 0,
        }
    }

    /// Absolute position of the next byte
    pub fn position(&self) -> usize {
        self.base + self.consumed
    }

    pub fn remaining(&self) -> usize {
        self.data.remaining()
    }

    pub fn is_empty(&self) -> bool {
        !self.data.has_remaining()
    }

    fn need(&self, count: usize) -> Result<(), FormatError> {
        if self.data.remaining() < count {
            return Err(FormatError::UnexpectedEof {
                position: self.position(),
            });
        }
        Ok(())
    }

    /// Take exactly `count` bytes as a zero-copy slice
    pub fn take(&mut self, count: usize) -> Result<Bytes, FormatError> {
        self.need(count)?;
        self.consumed += count;
        Ok(self.data.split_to(count))
    }

    pub fn u8(&mut self) -> Result<u8, FormatError> {
        self.need(1)?;
        self.consumed += 1;
        Ok(self.data.get_u8())
    }

    pub fn u16_le(&mut self) -> Result<u16, FormatError> {
        self.need(2)?;
        self.consumed += 2;
        Ok(self.data.get_u16_le())
    }

    pub fn u32_le(&mut self) -> Result<u32, FormatError> {
        self.need(4)?;
        self.consumed += 4;
        Ok(self.data.get_u32_le())
    }

    pub fn u64_le(&mut self) -> Result<u64, FormatError> {
        self.need(8)?;
        self.consumed += 8;
        Ok(self.data.get_u64_le())
    }

    pub fn i64_le(&mut self) -> Result<i64, FormatError> {
        self.need(8)?;
        self.consumed += 8;
        Ok(self.data.get_i64_le())
    }

    pub fn f64_le(&mut self) -> Result<f64, FormatError> {
        self.need(8)?;
        self.consumed += 8;
        Ok(self.data.get_f64_le())
    }

    /// Parse `n` items with `item`, never pre-allocating beyond what the
    /// remaining input could hold
    pub fn ntimes<T>(
        &mut self,
        n: usize,
        min_item_size: usize,
        mut item: impl FnMut(&mut Self) -> Result<T, FormatError>,
    ) -> Result<Vec<T>, FormatError> {
        let bound = self.remaining() / min_item_size.max(1);
        let mut items = Vec::with_capacity(n.min(bound));
        for _ in 0..n {
            items.push(item(self)?);
        }
        Ok(items)
    }
}
