//! Serialization of container files

mod array;
mod block;
mod node;

pub use block::{BlockTable, EncodedBlock, encode_block, write_block};
pub use node::write_node;

use crate::error::Result;
use crate::types::{HEADER_SIZE, MAGIC, Node, VERSION};
use std::io::Write;

/// Write a container: header, structured section, block index, blocks.
///
/// The structured section is encoded up front because the header records
/// its length.
pub fn write<W: Write>(writer: &mut W, root: &Node, blocks: &[EncodedBlock]) -> Result<()> {
    let mut tree = Vec::new();
    write_node(&mut tree, root)?;

    let index_offset = (HEADER_SIZE + tree.len()) as u64;
    let mut offset = index_offset + 8 * blocks.len() as u64;
    let mut offsets = Vec::with_capacity(blocks.len());
    for block in blocks {
        offsets.push(offset);
        offset += block.encoded_len();
    }
    let total_len = offset;

    writer.write_all(MAGIC)?;
    writer.write_all(&VERSION.to_le_bytes())?;
    writer.write_all(&0u32.to_le_bytes())?; // flags (reserved)
    writer.write_all(&(tree.len() as u64).to_le_bytes())?;
    writer.write_all(&(blocks.len() as u64).to_le_bytes())?;
    writer.write_all(&total_len.to_le_bytes())?;

    writer.write_all(&tree)?;
    for offset in &offsets {
        writer.write_all(&offset.to_le_bytes())?;
    }
    for block in blocks {
        write_block(writer, block)?;
    }
    Ok(())
}

/// Write a container to bytes
pub fn to_bytes(root: &Node, blocks: &[EncodedBlock]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write(&mut buf, root, blocks)?;
    Ok(buf)
}
