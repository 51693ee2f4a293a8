//! Header constants

/// Magic bytes identifying a container file
pub const MAGIC: &[u8; 8] = b"ASDFRS\0\0";

/// Current format version
pub const VERSION: u32 = 1;

/// Header size in bytes (magic + version + flags + tree_len + block_count + total_len)
pub const HEADER_SIZE: usize = 40;

/// Magic token opening every block section ("SBLK" with the high bit of the S set)
pub const BLOCK_MAGIC: &[u8; 4] = b"\xd3BLK";

/// Block descriptor size in bytes, payload excluded
pub const BLOCK_HEADER_SIZE: usize = 4 + 2 + BLOCK_HEADER_BODY as usize;

/// Bytes following the `header_size` field up to the payload
pub const BLOCK_HEADER_BODY: u16 = 1 + 1 + 2 + 8 + 8 + 32;

/// Parsed file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub tree_len: u64,
    pub block_count: u64,
    pub total_len: u64,
}

impl Header {
    /// Byte offset of the block index table
    pub fn index_offset(&self) -> u64 {
        HEADER_SIZE as u64 + self.tree_len
    }
}
