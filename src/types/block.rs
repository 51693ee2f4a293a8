//! Block section descriptor

use crate::codec::Codec;

/// Checksum stored when checksums are disabled
pub const NO_CHECKSUM: [u8; 32] = [0; 32];

/// Descriptor preceding every block payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDescriptor {
    /// Codec actually used for the stored payload
    pub codec: Codec,
    pub level: u8,
    pub compressed_len: u64,
    pub decompressed_len: u64,
    /// blake3 hash of the stored payload, or all zeros
    pub checksum: [u8; 32],
}

impl BlockDescriptor {
    pub fn has_checksum(&self) -> bool {
        self.checksum != NO_CHECKSUM
    }
}
