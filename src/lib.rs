//! asdf - ASDF-style container documents
//!
//! A single-file, self-describing binary container for named typed
//! N-dimensional arrays, organized in nested groups, sequences and tables, with
//! references that can point into the same document or into other files.
//!
//! # Features
//!
//! - Arrays stored inline in the structured section or in separate blocks
//! - Block compression with zlib or bzip2, blake3 checksums per block
//! - Blocks are read and decompressed only when their data is requested
//! - References resolved lazily, external documents opened on demand
//! - Atomic file writes
//! - Little-endian, portable across architectures
//!
//! # Example
//!
//! ```no_run
//! use asdf::{Codec, Document, Entry, Group, Ndarray, Placement, Reference, Scalar};
//!
//! let alpha = Ndarray::create_int64(&[1, 2, 3], Placement::Block, Codec::Zlib, 9, &[], &[3])?;
//! let link = Reference::create_from_path("", &["group", "alpha", "data"]);
//! let group = Group::create([
//!     ("alpha", Entry::create_from_ndarray("alpha", alpha, "")),
//!     ("link", Entry::create_from_reference("link", link, "points at alpha")),
//! ])?;
//!
//! Document::create_from_group([("version", Scalar::Int(1))], group).write("demo.asdf")?;
//!
//! let doc = asdf::read("demo.asdf")?;
//! let link = doc.get_group().get("link").unwrap().get_reference()?;
//! let alpha = Ndarray::read(&link.resolve()?)?;
//! assert_eq!(alpha.get_data_vector_int64()?, vec![1, 2, 3]);
//! # Ok::<(), asdf::Error>(())
//! ```

pub mod codec;
pub mod config;
pub mod document;
pub mod error;
pub mod ndarray;
pub mod parser;
pub mod reader;
pub mod reference;
pub mod tree;
pub mod types;
pub mod writer;

#[cfg(feature = "ndarray")]
pub mod ndarray_ext;

use std::path::Path;

// Re-export common types at crate root
pub use crate::codec::Codec;
pub use crate::config::{CopyOptions, ReadOptions, WriteOptions};
pub use crate::document::Document;
pub use crate::error::{Error, FormatError, Result};
pub use crate::ndarray::{ByteOrder, Element, Ndarray, Placement};
pub use crate::reader::{ReaderState, ReaderStateNode};
pub use crate::reference::Reference;
pub use crate::tree::{Column, Entry, EntryPayload, Group, Sequence, Table};
pub use crate::types::{ElementType, Node, Scalar};

/// Read a document file with default options
pub fn read(path: impl AsRef<Path>) -> Result<Document> {
    Document::read(path)
}
