//! Block compression codecs
//!
//! Every codec is a pure byte-buffer transform identified by a stable
//! numeric id that is persisted in block descriptors:
//!
//! - `None` (0): passthrough, the level is ignored
//! - `Zlib` (1): DEFLATE in a zlib wrapper via `flate2`, levels 0-9
//! - `Bzip2` (2): Burrows-Wheeler via `bzip2`, levels 1-9

use crate::error::{Error, Result};
use std::io::{Read, Write};

/// Compression codec applied to block payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Codec {
    #[default]
    None = 0,
    Zlib = 1,
    Bzip2 = 2,
}

impl Codec {
    pub const ALL: [Codec; 3] = [Codec::None, Codec::Zlib, Codec::Bzip2];

    pub fn from_u8(id: u8) -> Option<Self> {
        match id {
            0 => Some(Codec::None),
            1 => Some(Codec::Zlib),
            2 => Some(Codec::Bzip2),
            _ => None,
        }
    }

    /// Name used for the `compression` key of ndarray descriptors
    pub fn name(self) -> &'static str {
        match self {
            Codec::None => "none",
            Codec::Zlib => "zlib",
            Codec::Bzip2 => "bzip2",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Codec::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Check that `level` is meaningful for this codec
    pub fn validate_level(self, level: u32) -> Result<()> {
        let valid = match self {
            Codec::None => true,
            Codec::Zlib => level <= 9,
            Codec::Bzip2 => (1..=9).contains(&level),
        };
        if valid {
            Ok(())
        } else {
            Err(Error::codec(self, format!("invalid compression level {}", level)))
        }
    }

    fn compressor(self, level: u32) -> Result<Box<dyn Compressor>> {
        self.validate_level(level)?;
        Ok(match self {
            Codec::None => Box::new(Passthrough),
            Codec::Zlib => Box::new(ZlibCompressor { level }),
            Codec::Bzip2 => Box::new(Bzip2Compressor { level }),
        })
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Compress `raw` with `codec` at `level`
pub fn compress(codec: Codec, level: u32, raw: &[u8]) -> Result<Vec<u8>> {
    codec.compressor(level)?.compress(raw)
}

/// Decompress `encoded`, failing unless exactly `expected_len` bytes come out
pub fn decompress(codec: Codec, encoded: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    // Decoding never depends on the level.
    let compressor: Box<dyn Compressor> = match codec {
        Codec::None => Box::new(Passthrough),
        Codec::Zlib => Box::new(ZlibCompressor { level: 0 }),
        Codec::Bzip2 => Box::new(Bzip2Compressor { level: 1 }),
    };
    let out = compressor.decompress(encoded, expected_len)?;
    if out.len() != expected_len {
        return Err(Error::codec(
            codec,
            format!(
                "decompressed length {} does not match recorded length {}",
                out.len(),
                expected_len
            ),
        ));
    }
    Ok(out)
}

trait Compressor {
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// Decode at most `expected_len + 1` bytes so that oversized streams are
    /// reported without being fully inflated.
    fn decompress(&self, input: &[u8], expected_len: usize) -> Result<Vec<u8>>;
}

struct Passthrough;

impl Compressor for Passthrough {
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(input.to_vec())
    }

    fn decompress(&self, input: &[u8], _expected_len: usize) -> Result<Vec<u8>> {
        Ok(input.to_vec())
    }
}

struct ZlibCompressor {
    level: u32,
}

impl Compressor for ZlibCompressor {
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = flate2::write::ZlibEncoder::new(
            Vec::with_capacity(input.len() / 2 + 16),
            flate2::Compression::new(self.level),
        );
        encoder
            .write_all(input)
            .map_err(|e| Error::codec(Codec::Zlib, e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| Error::codec(Codec::Zlib, e.to_string()))
    }

    fn decompress(&self, input: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        let decoder = flate2::read::ZlibDecoder::new(input);
        read_bounded(decoder, expected_len).map_err(|e| Error::codec(Codec::Zlib, e.to_string()))
    }
}

struct Bzip2Compressor {
    level: u32,
}

impl Compressor for Bzip2Compressor {
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = bzip2::write::BzEncoder::new(
            Vec::with_capacity(input.len() / 2 + 64),
            bzip2::Compression::new(self.level),
        );
        encoder
            .write_all(input)
            .map_err(|e| Error::codec(Codec::Bzip2, e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| Error::codec(Codec::Bzip2, e.to_string()))
    }

    fn decompress(&self, input: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        let decoder = bzip2::read::BzDecoder::new(input);
        read_bounded(decoder, expected_len).map_err(|e| Error::codec(Codec::Bzip2, e.to_string()))
    }
}

fn read_bounded<R: Read>(reader: R, expected_len: usize) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_len);
    reader
        .take(expected_len as u64 + 1)
        .read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        (0..10_000u32).flat_map(|i| ((i % 97) as u16).to_le_bytes()).collect()
    }

    #[test]
    fn every_codec_roundtrips_at_several_levels() {
        let data = sample();
        for codec in Codec::ALL {
            for level in [1, 5, 9] {
                let encoded = compress(codec, level, &data).unwrap();
                let decoded = decompress(codec, &encoded, data.len()).unwrap();
                assert_eq!(decoded, data, "{} level {}", codec, level);
            }
        }
    }

    #[test]
    fn real_codecs_shrink_repetitive_data() {
        let data = sample();
        assert!(compress(Codec::Zlib, 9, &data).unwrap().len() < data.len());
        assert!(compress(Codec::Bzip2, 9, &data).unwrap().len() < data.len());
    }

    #[test]
    fn empty_payloads() {
        for codec in Codec::ALL {
            let encoded = compress(codec, 1, &[]).unwrap();
            assert!(decompress(codec, &encoded, 0).unwrap().is_empty());
        }
    }

    #[test]
    fn length_mismatch_is_a_codec_error() {
        let data = sample();
        for codec in Codec::ALL {
            let encoded = compress(codec, 6, &data).unwrap();
            let short = decompress(codec, &encoded, data.len() - 1);
            assert!(matches!(short, Err(Error::Codec { .. })), "{}", codec);
            let long = decompress(codec, &encoded, data.len() + 10);
            assert!(matches!(long, Err(Error::Codec { .. })), "{}", codec);
        }
    }

    #[test]
    fn malformed_streams_are_rejected() {
        let garbage = vec![0xAAu8; 64];
        assert!(matches!(
            decompress(Codec::Zlib, &garbage, 64),
            Err(Error::Codec {
                codec: Codec::Zlib,
                ..
            })
        ));
        assert!(matches!(
            decompress(Codec::Bzip2, &garbage, 64),
            Err(Error::Codec {
                codec: Codec::Bzip2,
                ..
            })
        ));
    }

    #[test]
    fn levels_are_validated() {
        assert!(Codec::None.validate_level(42).is_ok());
        assert!(Codec::Zlib.validate_level(0).is_ok());
        assert!(Codec::Zlib.validate_level(10).is_err());
        assert!(Codec::Bzip2.validate_level(0).is_err());
        assert!(compress(Codec::Bzip2, 12, b"abc").is_err());
    }

    #[test]
    fn ids_and_names_are_stable() {
        assert_eq!(Codec::None as u8, 0);
        assert_eq!(Codec::Zlib as u8, 1);
        assert_eq!(Codec::Bzip2 as u8, 2);
        for codec in Codec::ALL {
            assert_eq!(Codec::from_u8(codec as u8), Some(codec));
            assert_eq!(Codec::from_name(codec.name()), Some(codec));
        }
        assert_eq!(Codec::from_u8(7), None);
    }
}
