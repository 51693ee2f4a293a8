//! Binary parser for the container format
//!
//! Parsing works over `bytes::Bytes`, so inline array data and block
//! payloads are views into the buffer that was read from disk.

mod array;
mod block;
mod cursor;
mod entry;
mod node;
mod string;

pub use block::parse_block_descriptor;
pub use cursor::ByteCursor;
pub use node::{MAX_DEPTH, parse_node};

use crate::error::FormatError;
use crate::types::{HEADER_SIZE, Header, MAGIC, Node, VERSION};
use bytes::Bytes;

/// Parse the fixed-size file header
pub fn parse_header(bytes: Bytes) -> Result<Header, FormatError> {
    if bytes.len() >= MAGIC.len() && &bytes[..MAGIC.len()] != MAGIC {
        return Err(FormatError::InvalidMagic);
    }

    let mut cursor = ByteCursor::new(bytes);
    cursor.take(MAGIC.len())?;

    let version = cursor.u32_le()?;
    if version != VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }
    let _flags = cursor.u32_le()?;

    Ok(Header {
        tree_len: cursor.u64_le()?,
        block_count: cursor.u64_le()?,
        total_len: cursor.u64_le()?,
    })
}

/// Parse the structured section; `tree` must hold exactly `tree_len` bytes
pub fn parse_tree(tree: Bytes) -> Result<Node, FormatError> {
    let mut cursor = ByteCursor::with_base(tree, HEADER_SIZE);
    let root = parse_node(&mut cursor)?;
    if !cursor.is_empty() {
        return Err(FormatError::Malformed {
            message: format!("{} trailing bytes after document root", cursor.remaining()).into(),
            position: cursor.position(),
        });
    }
    if root.as_map().is_none() {
        return Err(FormatError::Malformed {
            message: format!("document root is a {}, expected a map", root.kind()).into(),
            position: HEADER_SIZE,
        });
    }
    Ok(root)
}

/// Parse the block index table into absolute block offsets
pub fn parse_block_index(index: Bytes, header: &Header) -> Result<Vec<u64>, FormatError> {
    let base = header.index_offset() as usize;
    let count = usize::try_from(header.block_count).map_err(|_| FormatError::UnexpectedEof {
        position: base,
    })?;

    let mut cursor = ByteCursor::with_base(index, base);
    let offsets = cursor.ntimes(count, 8, ByteCursor::u64_le)?;

    let blocks_start = header.block_count.saturating_mul(8).saturating_add(base as u64);
    for &offset in &offsets {
        if offset < blocks_start || offset >= header.total_len {
            return Err(FormatError::Malformed {
                message: format!("block offset {} outside the block area", offset).into(),
                position: base,
            });
        }
    }
    Ok(offsets)
}
