//! String parsing helpers

use super::cursor::ByteCursor;
use crate::error::FormatError;

/// Parse a u32 length-prefixed UTF-8 string (for values)
pub fn parse_string(cursor: &mut ByteCursor) -> Result<String, FormatError> {
    let len = cursor.u32_le()? as usize;
    utf8(cursor, len)
}

/// Parse a u16 length-prefixed UTF-8 string (for map keys)
pub fn parse_key(cursor: &mut ByteCursor) -> Result<String, FormatError> {
    let len = cursor.u16_le()? as usize;
    utf8(cursor, len)
}

fn utf8(cursor: &mut ByteCursor, len: usize) -> Result<String, FormatError> {
    let position = cursor.position();
    let bytes = cursor.take(len)?;
    std::str::from_utf8(&bytes)
        .map(str::to_owned)
        .map_err(|_| FormatError::InvalidUtf8 { position })
}
