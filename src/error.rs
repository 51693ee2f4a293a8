//! Error types for asdf

use crate::codec::Codec;
use crate::types::ElementType;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed structured or block section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Invalid magic bytes
    InvalidMagic,
    /// Unsupported version
    UnsupportedVersion(u32),
    /// Invalid node tag
    InvalidNodeTag { tag: u8, position: usize },
    /// Invalid element type tag
    InvalidDType { tag: u8, position: usize },
    /// Invalid UTF-8 in string
    InvalidUtf8 { position: usize },
    /// Input ended in the middle of an item
    UnexpectedEof { position: usize },
    /// File is shorter or longer than its header claims
    Truncated { expected: u64, actual: u64 },
    /// Data size mismatch
    DataSizeMismatch { expected: u64, actual: u64 },
    /// Block section does not start with the block magic
    InvalidBlockMagic { index: usize, offset: u64 },
    /// Structurally valid bytes that do not describe a valid document
    Malformed {
        message: Cow<'static, str>,
        position: usize,
    },
}

impl FormatError {
    pub(crate) fn malformed(message: impl Into<Cow<'static, str>>) -> Self {
        FormatError::Malformed {
            message: message.into(),
            position: 0,
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::InvalidMagic => write!(f, "Invalid magic bytes, not an asdf container"),
            FormatError::UnsupportedVersion(v) => write!(f, "Unsupported format version: {}", v),
            FormatError::InvalidNodeTag { tag, position } => {
                write!(f, "Invalid node tag 0x{:02X} at position {}", tag, position)
            }
            FormatError::InvalidDType { tag, position } => {
                write!(f, "Invalid dtype 0x{:02X} at position {}", tag, position)
            }
            FormatError::InvalidUtf8 { position } => {
                write!(f, "Invalid UTF-8 in string at position {}", position)
            }
            FormatError::UnexpectedEof { position } => {
                write!(f, "Unexpected end of input at position {}", position)
            }
            FormatError::Truncated { expected, actual } => write!(
                f,
                "File length mismatch: header says {} bytes, found {}",
                expected, actual
            ),
            FormatError::DataSizeMismatch { expected, actual } => write!(
                f,
                "Data size mismatch: expected {} bytes, got {}",
                expected, actual
            ),
            FormatError::InvalidBlockMagic { index, offset } => write!(
                f,
                "Block {} at offset {} does not start with the block magic",
                index, offset
            ),
            FormatError::Malformed { message, position } => {
                write!(f, "{} at position {}", message, position)
            }
        }
    }
}

impl StdError for FormatError {}

/// Crate error type
#[derive(Debug)]
pub enum Error {
    /// Element count disagrees with the declared shape or layout
    ShapeMismatch { shape: Vec<u64>, message: String },
    /// Data requested as a different element type than stored
    TypeMismatch {
        expected: ElementType,
        actual: ElementType,
    },
    /// Wrong accessor for the stored entry or node variant
    VariantMismatch {
        expected: &'static str,
        actual: &'static str,
    },
    /// Compression or decompression failure
    Codec { codec: Codec, message: String },
    /// A reference segment is absent from the target tree
    UnresolvedPath { path: String, segment: String },
    /// A reference segment cannot address the node kind it is applied to
    PathType {
        path: String,
        segment: String,
        kind: &'static str,
    },
    /// An external document could not be opened
    ExternalOpen { path: PathBuf, source: Box<Error> },
    /// Malformed file contents
    Format(FormatError),
    /// Two group entries share a key
    DuplicateKey(String),
    /// Key that cannot be stored (contains '/')
    InvalidKey(String),
    /// Local reference that does not belong to any document
    UnboundReference(String),
    /// I/O error from the filesystem
    Io(io::Error),
}

impl Error {
    pub(crate) fn codec(codec: Codec, message: impl Into<String>) -> Self {
        Error::Codec {
            codec,
            message: message.into(),
        }
    }

    pub(crate) fn shape(shape: &[u64], message: impl Into<String>) -> Self {
        Error::ShapeMismatch {
            shape: shape.to_vec(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ShapeMismatch { shape, message } => {
                write!(f, "Shape {:?} mismatch: {}", shape, message)
            }
            Error::TypeMismatch { expected, actual } => {
                write!(f, "Type mismatch: requested {}, stored {}", expected, actual)
            }
            Error::VariantMismatch { expected, actual } => {
                write!(f, "Variant mismatch: expected {}, found {}", expected, actual)
            }
            Error::Codec { codec, message } => write!(f, "{} codec error: {}", codec, message),
            Error::UnresolvedPath { path, segment } => {
                write!(f, "path not found: segment '{}' of {}", segment, path)
            }
            Error::PathType {
                path,
                segment,
                kind,
            } => write!(
                f,
                "segment '{}' of {} cannot address a {}",
                segment, path, kind
            ),
            Error::ExternalOpen { path, source } => {
                write!(f, "cannot open external document {}: {}", path.display(), source)
            }
            Error::Format(e) => write!(f, "Format error: {}", e),
            Error::DuplicateKey(key) => write!(f, "duplicate group key: {:?}", key),
            Error::InvalidKey(key) => write!(f, "key contains '/': {:?}", key),
            Error::UnboundReference(target) => {
                write!(f, "reference <{}> is not bound to a document", target)
            }
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::ExternalOpen { source, .. } => Some(source.as_ref()),
            Error::Format(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FormatError> for Error {
    fn from(e: FormatError) -> Self {
        Error::Format(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
