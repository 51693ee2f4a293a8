//! Block section encoding

use crate::codec::{self, Codec};
use crate::config::WriteOptions;
use crate::error::Result;
use crate::types::{BLOCK_HEADER_BODY, BLOCK_HEADER_SIZE, BLOCK_MAGIC, BlockDescriptor, NO_CHECKSUM};
use std::io::{self, Write};
use tracing::trace;

/// A compressed block payload with its descriptor
#[derive(Debug, Clone)]
pub struct EncodedBlock {
    pub descriptor: BlockDescriptor,
    pub payload: Vec<u8>,
}

impl EncodedBlock {
    /// Size of the block section on disk, descriptor included
    pub fn encoded_len(&self) -> u64 {
        (BLOCK_HEADER_SIZE + self.payload.len()) as u64
    }
}

/// Compress `raw` into a block.
///
/// With `skip_incompressible`, a payload that the codec does not shrink is
/// stored with [`Codec::None`] instead.
pub fn encode_block(
    raw: &[u8],
    codec: Codec,
    level: u32,
    options: &WriteOptions,
) -> Result<EncodedBlock> {
    let compressed = codec::compress(codec, level, raw)?;

    let (codec, level, payload) = if codec != Codec::None
        && options.skip_incompressible
        && compressed.len() >= raw.len()
    {
        trace!(
            %codec,
            raw = raw.len(),
            compressed = compressed.len(),
            "payload did not shrink, storing uncompressed"
        );
        (Codec::None, 0, raw.to_vec())
    } else if codec == Codec::None {
        (codec, 0, compressed)
    } else {
        (codec, level, compressed)
    };

    let checksum = if options.checksums {
        *blake3::hash(&payload).as_bytes()
    } else {
        NO_CHECKSUM
    };

    Ok(EncodedBlock {
        descriptor: BlockDescriptor {
            codec,
            // Levels above 9 are rejected by every compressing codec.
            level: level as u8,
            compressed_len: payload.len() as u64,
            decompressed_len: raw.len() as u64,
            checksum,
        },
        payload,
    })
}

/// Write a block section (descriptor + payload)
pub fn write_block<W: Write>(writer: &mut W, block: &EncodedBlock) -> io::Result<()> {
    let d = &block.descriptor;
    writer.write_all(BLOCK_MAGIC)?;
    writer.write_all(&BLOCK_HEADER_BODY.to_le_bytes())?;
    writer.write_all(&[d.codec as u8, d.level])?;
    writer.write_all(&0u16.to_le_bytes())?; // flags (reserved)
    writer.write_all(&d.compressed_len.to_le_bytes())?;
    writer.write_all(&d.decompressed_len.to_le_bytes())?;
    writer.write_all(&d.checksum)?;
    writer.write_all(&block.payload)?;
    Ok(())
}

/// Blocks collected while a document tree is converted to nodes; the
/// position of a block in the table is its `source` index.
#[derive(Debug)]
pub struct BlockTable {
    options: WriteOptions,
    blocks: Vec<EncodedBlock>,
}

impl BlockTable {
    pub fn new(options: WriteOptions) -> Self {
        Self {
            options,
            blocks: Vec::new(),
        }
    }

    /// Encode `raw` and return its block index
    pub fn push(&mut self, raw: &[u8], codec: Codec, level: u32) -> Result<u64> {
        let block = encode_block(raw, codec, level, &self.options)?;
        self.blocks.push(block);
        Ok(self.blocks.len() as u64 - 1)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[EncodedBlock] {
        &self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ByteCursor, parse_block_descriptor};
    use bytes::Bytes;

    #[test]
    fn test_compressible_block() {
        let raw = vec![0u8; 4096];
        let block = encode_block(&raw, Codec::Zlib, 6, &WriteOptions::default()).unwrap();
        assert_eq!(block.descriptor.codec, Codec::Zlib);
        assert_eq!(block.descriptor.level, 6);
        assert_eq!(block.descriptor.decompressed_len, 4096);
        assert!(block.payload.len() < raw.len());
        assert_eq!(
            block.descriptor.checksum,
            *blake3::hash(&block.payload).as_bytes()
        );
    }

    #[test]
    fn test_incompressible_block_stored_raw() {
        let raw: Vec<u8> = (0..16).collect();
        let block = encode_block(&raw, Codec::Bzip2, 9, &WriteOptions::default()).unwrap();
        assert_eq!(block.descriptor.codec, Codec::None);
        assert_eq!(block.payload, raw);

        let options = WriteOptions {
            skip_incompressible: false,
            ..WriteOptions::default()
        };
        let block = encode_block(&raw, Codec::Bzip2, 9, &options).unwrap();
        assert_eq!(block.descriptor.codec, Codec::Bzip2);
        assert!(block.payload.len() > raw.len());
    }

    #[test]
    fn test_without_checksums() {
        let options = WriteOptions {
            checksums: false,
            ..WriteOptions::default()
        };
        let block = encode_block(b"abc", Codec::None, 0, &options).unwrap();
        assert!(!block.descriptor.has_checksum());
    }

    #[test]
    fn test_invalid_level() {
        let result = encode_block(b"abc", Codec::Zlib, 10, &WriteOptions::default());
        assert!(matches!(result, Err(crate::Error::Codec { .. })));
    }

    #[test]
    fn test_written_descriptor_parses() {
        let raw = vec![1u8; 1000];
        let block = encode_block(&raw, Codec::Zlib, 9, &WriteOptions::default()).unwrap();
        let mut buf = Vec::new();
        write_block(&mut buf, &block).unwrap();
        assert_eq!(buf.len() as u64, block.encoded_len());

        let mut cursor = ByteCursor::new(Bytes::from(buf));
        let descriptor = parse_block_descriptor(&mut cursor, 0).unwrap();
        assert_eq!(descriptor, block.descriptor);
        assert_eq!(cursor.remaining(), block.payload.len());
    }

    #[test]
    fn test_table_indices() {
        let mut table = BlockTable::new(WriteOptions::default());
        assert!(table.is_empty());
        assert_eq!(table.push(b"first", Codec::None, 0).unwrap(), 0);
        assert_eq!(table.push(b"second", Codec::None, 0).unwrap(), 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.blocks()[1].payload, b"second");
    }
}
