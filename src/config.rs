//! Options for reading, writing and copying documents

use crate::codec::Codec;
use crate::ndarray::Placement;

/// Options applied while writing a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Store a blake3 checksum of every block payload
    pub checksums: bool,
    /// Store blocks uncompressed when the codec does not shrink them
    pub skip_incompressible: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            checksums: true,
            skip_incompressible: true,
        }
    }
}

/// Options applied while reading a document and the external documents it
/// references
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Verify block checksums when a block is materialized
    pub verify_checksums: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            verify_checksums: true,
        }
    }
}

/// Overrides applied by [`Document::copy`](crate::Document::copy).
///
/// `None` keeps the value stored in the source array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOptions {
    pub placement: Option<Placement>,
    pub codec: Option<Codec>,
    pub level: Option<u32>,
}

impl CopyOptions {
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn with_codec(mut self, codec: Codec, level: u32) -> Self {
        self.codec = Some(codec);
        self.level = Some(level);
        self
    }
}
