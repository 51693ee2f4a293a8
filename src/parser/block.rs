//! Block descriptor parsing

use super::cursor::ByteCursor;
use crate::codec::Codec;
use crate::error::FormatError;
use crate::types::{BLOCK_HEADER_BODY, BLOCK_MAGIC, BlockDescriptor};

/// Parse the descriptor of block `index`; the cursor must start at the
/// block magic and is left at the first payload byte.
pub fn parse_block_descriptor(
    cursor: &mut ByteCursor,
    index: usize,
) -> Result<BlockDescriptor, FormatError> {
    let offset = cursor.position() as u64;
    let magic = cursor.take(BLOCK_MAGIC.len())?;
    if magic.as_ref() != BLOCK_MAGIC {
        return Err(FormatError::InvalidBlockMagic { index, offset });
    }

    let position = cursor.position();
    let header_size = cursor.u16_le()?;
    if header_size < BLOCK_HEADER_BODY {
        return Err(FormatError::Malformed {
            message: format!("block header size {} is too small", header_size).into(),
            position,
        });
    }

    let position = cursor.position();
    let codec_id = cursor.u8()?;
    let codec = Codec::from_u8(codec_id).ok_or_else(|| FormatError::Malformed {
        message: format!("unknown codec id {}", codec_id).into(),
        position,
    })?;
    let level = cursor.u8()?;
    let _flags = cursor.u16_le()?;
    let compressed_len = cursor.u64_le()?;
    let decompressed_len = cursor.u64_le()?;

    let mut checksum = [0u8; 32];
    checksum.copy_from_slice(&cursor.take(32)?);

    // Newer writers may append fields we do not know about yet.
    cursor.take(usize::from(header_size - BLOCK_HEADER_BODY))?;

    Ok(BlockDescriptor {
        codec,
        level,
        compressed_len,
        decompressed_len,
        checksum,
    })
}
