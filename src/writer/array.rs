//! Inline array serialization

use crate::error::{FormatError, Result};
use crate::types::{InlineArray, MAX_NDIM, NodeTag};
use std::io::Write;

/// Write an inline array node
pub fn write_array<W: Write>(writer: &mut W, arr: &InlineArray) -> Result<()> {
    let ndim = u8::try_from(arr.shape.len()).map_err(|_| {
        FormatError::malformed(format!(
            "inline array has {} dimensions, at most {} fit",
            arr.shape.len(),
            MAX_NDIM
        ))
    })?;
    writer.write_all(&[NodeTag::Array as u8])?;
    writer.write_all(&[arr.dtype as u8])?;
    writer.write_all(&[ndim])?;
    for dim in &arr.shape {
        writer.write_all(&dim.to_le_bytes())?;
    }
    writer.write_all(&(arr.data.len() as u64).to_le_bytes())?;
    writer.write_all(&arr.data)?;
    Ok(())
}
