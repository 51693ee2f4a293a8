//! Shared reader state of an opened document
//!
//! A [`ReaderState`] owns everything a parsed document needs after the
//! structured section was read: the source bytes or file handle, the lazily
//! materialized blocks, and the external documents opened while resolving
//! references. Handles into the tree ([`ReaderStateNode`]) keep the state
//! alive through an `Arc`.

use crate::codec::{self, Codec};
use crate::config::ReadOptions;
use crate::error::{Error, FormatError, Result};
use crate::parser::{self, ByteCursor};
use crate::types::{BLOCK_MAGIC, HEADER_SIZE, Node};
use bytes::Bytes;
use parking_lot::Mutex;
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// Where the bytes of a document come from
enum Source {
    File(Mutex<File>),
    Memory(Bytes),
}

impl Source {
    fn read_at(&self, offset: u64, len: usize) -> Result<Bytes> {
        match self {
            Source::Memory(bytes) => {
                let start = usize::try_from(offset).unwrap_or(usize::MAX);
                match start.checked_add(len) {
                    Some(end) if end <= bytes.len() => Ok(bytes.slice(start..end)),
                    _ => Err(FormatError::UnexpectedEof {
                        position: bytes.len(),
                    }
                    .into()),
                }
            }
            Source::File(file) => {
                let mut file = file.lock();
                file.seek(SeekFrom::Start(offset))?;
                let mut buf = vec![0u8; len];
                file.read_exact(&mut buf).map_err(|e| match e.kind() {
                    io::ErrorKind::UnexpectedEof => Error::Format(FormatError::UnexpectedEof {
                        position: offset as usize,
                    }),
                    _ => Error::Io(e),
                })?;
                Ok(Bytes::from(buf))
            }
        }
    }
}

/// Block payload state: located on disk, or decoded and cached
#[derive(Debug, Clone)]
enum BlockSlot {
    Located { offset: u64 },
    Materialized(Bytes),
}

/// Parsed document plus the resources needed to finish reading it
pub struct ReaderState {
    path: Option<PathBuf>,
    root: Node,
    total_len: u64,
    source: Source,
    blocks: Mutex<Vec<BlockSlot>>,
    externals: Mutex<Vec<(PathBuf, Arc<ReaderState>)>>,
    options: ReadOptions,
}

impl ReaderState {
    /// Open a document file and parse its structured section
    pub fn open(path: impl AsRef<Path>, options: ReadOptions) -> Result<Arc<Self>> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        let source = Source::File(Mutex::new(file));
        let state = Self::load(source, len, Some(path.to_path_buf()), options)?;
        debug!(
            path = %path.display(),
            blocks = state.block_count(),
            "opened document"
        );
        Ok(Arc::new(state))
    }

    /// Parse a document held in memory
    pub fn from_bytes(bytes: impl Into<Bytes>, options: ReadOptions) -> Result<Arc<Self>> {
        let bytes = bytes.into();
        let len = bytes.len() as u64;
        let state = Self::load(Source::Memory(bytes), len, None, options)?;
        debug!(blocks = state.block_count(), "parsed in-memory document");
        Ok(Arc::new(state))
    }

    fn load(source: Source, len: u64, path: Option<PathBuf>, options: ReadOptions) -> Result<Self> {
        let header_len = len.min(HEADER_SIZE as u64) as usize;
        let header = parser::parse_header(source.read_at(0, header_len)?)?;
        if header.total_len != len {
            return Err(FormatError::Truncated {
                expected: header.total_len,
                actual: len,
            }
            .into());
        }

        let index_end = header
            .tree_len
            .checked_add(HEADER_SIZE as u64)
            .and_then(|start| header.block_count.checked_mul(8)?.checked_add(start))
            .filter(|&end| end <= len)
            .ok_or_else(|| FormatError::Malformed {
                message: "structured section or block index extends past the end of file".into(),
                position: 0,
            })?;
        let index_len = index_end - header.index_offset();

        let tree = source.read_at(HEADER_SIZE as u64, header.tree_len as usize)?;
        let root = parser::parse_tree(tree)?;

        let index = source.read_at(header.index_offset(), index_len as usize)?;
        let blocks = parser::parse_block_index(index, &header)?
            .into_iter()
            .map(|offset| BlockSlot::Located { offset })
            .collect();

        Ok(Self {
            path,
            root,
            total_len: len,
            source,
            blocks: Mutex::new(blocks),
            externals: Mutex::new(Vec::new()),
            options,
        })
    }

    /// Path of the file this document was read from
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Handle on the document root
    pub fn root_node(self: &Arc<Self>) -> ReaderStateNode {
        ReaderStateNode {
            state: Arc::clone(self),
            node: self.root.clone(),
            path: Vec::new(),
        }
    }

    pub fn block_count(&self) -> usize {
        self.blocks.lock().len()
    }

    pub fn is_block_materialized(&self, index: usize) -> bool {
        matches!(
            self.blocks.lock().get(index),
            Some(BlockSlot::Materialized(_))
        )
    }

    /// Decoded payload of block `index`, read and decompressed on first use
    pub fn block_data(&self, index: usize) -> Result<Bytes> {
        let mut blocks = self.blocks.lock();
        let offset = match blocks.get(index) {
            Some(BlockSlot::Materialized(data)) => return Ok(data.clone()),
            Some(BlockSlot::Located { offset }) => *offset,
            None => {
                return Err(FormatError::malformed(format!(
                    "block {} out of range ({} blocks)",
                    index,
                    blocks.len()
                ))
                .into());
            }
        };

        let data = self.materialize(index, offset)?;
        blocks[index] = BlockSlot::Materialized(data.clone());
        Ok(data)
    }

    fn materialize(&self, index: usize, offset: u64) -> Result<Bytes> {
        // Magic and header_size first; the descriptor length depends on the latter.
        let prefix_len = BLOCK_MAGIC.len() + 2;
        let prefix = self.source.read_at(offset, prefix_len)?;
        let header_size = u16::from_le_bytes([prefix[4], prefix[5]]);

        let descriptor_len = prefix_len + usize::from(header_size);
        let descriptor_bytes = self.source.read_at(offset, descriptor_len)?;
        let mut cursor = ByteCursor::with_base(descriptor_bytes, offset as usize);
        let descriptor = parser::parse_block_descriptor(&mut cursor, index)?;

        let payload_offset = offset + descriptor_len as u64;
        if payload_offset.saturating_add(descriptor.compressed_len) > self.total_len {
            return Err(FormatError::Truncated {
                expected: payload_offset.saturating_add(descriptor.compressed_len),
                actual: self.total_len,
            }
            .into());
        }
        let payload = self
            .source
            .read_at(payload_offset, descriptor.compressed_len as usize)?;

        if self.options.verify_checksums
            && descriptor.has_checksum()
            && *blake3::hash(&payload).as_bytes() != descriptor.checksum
        {
            return Err(Error::codec(
                descriptor.codec,
                format!("checksum mismatch in block {}", index),
            ));
        }

        let expected = usize::try_from(descriptor.decompressed_len)
            .map_err(|_| Error::codec(descriptor.codec, "block too large for this platform"))?;
        let data = match descriptor.codec {
            Codec::None if payload.len() == expected => payload,
            codec => Bytes::from(codec::decompress(codec, &payload, expected)?),
        };

        trace!(
            index,
            codec = %descriptor.codec,
            stored = descriptor.compressed_len,
            decoded = data.len(),
            "materialized block"
        );
        Ok(data)
    }

    /// Descend from the document root along `segments`
    pub fn resolve_path(self: &Arc<Self>, segments: &[String]) -> Result<ReaderStateNode> {
        let mut node = self.root_node();
        for segment in segments {
            node = node.child(segment)?;
        }
        trace!(document = %self.display_name(), path = ?segments, "resolved path");
        Ok(node)
    }

    /// External document named `name`, opened on first use and cached for
    /// the lifetime of this state
    pub fn external(&self, name: &str) -> Result<Arc<ReaderState>> {
        let path = external_path(self.path.as_deref(), name);

        let mut externals = self.externals.lock();
        if let Some((_, state)) = externals.iter().find(|(p, _)| *p == path) {
            return Ok(Arc::clone(state));
        }

        let state = open_external(&path, self.options)?;
        externals.push((path, Arc::clone(&state)));
        Ok(state)
    }

    pub(crate) fn display_name(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => "<memory>".to_string(),
        }
    }
}

/// Resolve an external document name against the referring document's
/// directory. `file://` prefixes are accepted.
pub(crate) fn external_path(referrer: Option<&Path>, name: &str) -> PathBuf {
    let name = Path::new(name.strip_prefix("file://").unwrap_or(name));
    let joined = match referrer.and_then(Path::parent) {
        Some(dir) if name.is_relative() => dir.join(name),
        _ => name.to_path_buf(),
    };
    std::fs::canonicalize(&joined).unwrap_or(joined)
}

pub(crate) fn open_external(path: &Path, options: ReadOptions) -> Result<Arc<ReaderState>> {
    debug!(path = %path.display(), "opening external document");
    ReaderState::open(path, options).map_err(|e| Error::ExternalOpen {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}

impl Drop for ReaderState {
    fn drop(&mut self) {
        // Most recently opened external documents go first.
        let externals = self.externals.get_mut();
        while let Some((path, state)) = externals.pop() {
            trace!(path = %path.display(), "releasing external document");
            drop(state);
        }
    }
}

impl fmt::Debug for ReaderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderState")
            .field("path", &self.path)
            .field("total_len", &self.total_len)
            .field("blocks", &self.blocks.lock().len())
            .field("externals", &self.externals.lock().len())
            .finish()
    }
}

/// A node of a read document together with the state that owns it and the
/// path that led to it
#[derive(Debug, Clone)]
pub struct ReaderStateNode {
    state: Arc<ReaderState>,
    node: Node,
    path: Vec<String>,
}

impl ReaderStateNode {
    pub fn state(&self) -> &Arc<ReaderState> {
        &self.state
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Segments from the document root to this node
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn is_reference(&self) -> bool {
        self.node.is_reference()
    }

    /// Descend one segment.
    ///
    /// Map children are addressed by key, list children by decimal index.
    pub fn child(&self, segment: &str) -> Result<ReaderStateNode> {
        let next = match &self.node {
            Node::Map(entries) => match entries.iter().find(|(k, _)| k == segment) {
                Some((_, node)) => node,
                None if segment.parse::<usize>().is_ok() => {
                    return Err(self.path_type_error(segment));
                }
                None => return Err(self.unresolved_error(segment)),
            },
            Node::List(items) => {
                let index: usize = segment
                    .parse()
                    .map_err(|_| self.path_type_error(segment))?;
                items
                    .get(index)
                    .ok_or_else(|| self.unresolved_error(segment))?
            }
            _ => return Err(self.path_type_error(segment)),
        };

        let mut path = self.path.clone();
        path.push(segment.to_string());
        Ok(ReaderStateNode {
            state: Arc::clone(&self.state),
            node: next.clone(),
            path,
        })
    }

    /// Child that may be absent; other lookup failures still propagate
    pub(crate) fn optional_child(&self, key: &str) -> Option<ReaderStateNode> {
        self.node.get(key)?;
        self.child(key).ok()
    }

    fn describe(&self) -> String {
        format!("{}#/{}", self.state.display_name(), self.path.join("/"))
    }

    fn unresolved_error(&self, segment: &str) -> Error {
        Error::UnresolvedPath {
            path: self.describe(),
            segment: segment.to_string(),
        }
    }

    fn path_type_error(&self, segment: &str) -> Error {
        Error::PathType {
            path: self.describe(),
            segment: segment.to_string(),
            kind: self.node.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WriteOptions;
    use crate::writer::{self, BlockTable};

    fn sample() -> Vec<u8> {
        let mut table = BlockTable::new(WriteOptions::default());
        table.push(&[3u8; 256], Codec::Zlib, 6).unwrap();
        let root = Node::Map(vec![
            (
                "group".into(),
                Node::Map(vec![
                    ("alpha".into(), Node::Int(1)),
                    (
                        "list".into(),
                        Node::List(vec![Node::from("x"), Node::from("y")]),
                    ),
                ]),
            ),
            ("count".into(), Node::Int(5)),
        ]);
        writer::to_bytes(&root, table.blocks()).unwrap()
    }

    fn open() -> Arc<ReaderState> {
        ReaderState::from_bytes(sample(), ReadOptions::default()).unwrap()
    }

    fn segments(path: &[&str]) -> Vec<String> {
        path.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_map_and_list() {
        let state = open();
        let node = state.resolve_path(&segments(&["group", "list", "1"])).unwrap();
        assert_eq!(node.node().as_str(), Some("y"));
        assert_eq!(node.path(), ["group", "list", "1"]);
    }

    #[test]
    fn test_missing_key_is_unresolved() {
        let state = open();
        let err = state.resolve_path(&segments(&["group", "beta"])).unwrap_err();
        assert!(matches!(err, Error::UnresolvedPath { segment, .. } if segment == "beta"));
    }

    #[test]
    fn test_numeric_segment_on_map_is_path_type() {
        let state = open();
        let err = state.resolve_path(&segments(&["group", "0"])).unwrap_err();
        assert!(matches!(err, Error::PathType { kind: "map", .. }));
    }

    #[test]
    fn test_list_index_errors() {
        let state = open();
        let err = state.resolve_path(&segments(&["group", "list", "x"])).unwrap_err();
        assert!(matches!(err, Error::PathType { kind: "list", .. }));

        let err = state.resolve_path(&segments(&["group", "list", "2"])).unwrap_err();
        assert!(matches!(err, Error::UnresolvedPath { .. }));
    }

    #[test]
    fn test_descending_into_scalar() {
        let state = open();
        let err = state.resolve_path(&segments(&["count", "x"])).unwrap_err();
        assert!(matches!(err, Error::PathType { kind: "int", .. }));
    }

    #[test]
    fn test_block_materialized_once() {
        let state = open();
        assert_eq!(state.block_count(), 1);
        assert!(!state.is_block_materialized(0));

        let first = state.block_data(0).unwrap();
        assert_eq!(&first[..], &[3u8; 256][..]);
        assert!(state.is_block_materialized(0));

        let second = state.block_data(0).unwrap();
        assert!(std::ptr::eq(first.as_ptr(), second.as_ptr()));
        assert!(state.block_data(1).is_err());
    }

    #[test]
    fn test_truncated_input() {
        let bytes = sample();
        let result = ReaderState::from_bytes(bytes[..bytes.len() - 1].to_vec(), ReadOptions::default());
        assert!(matches!(
            result,
            Err(Error::Format(FormatError::Truncated { .. }))
        ));
    }

    #[test]
    fn test_external_path() {
        let referrer = Path::new("/data/run/main.asdf");
        assert_eq!(
            external_path(Some(referrer), "file:///abs/other.asdf"),
            PathBuf::from("/abs/other.asdf")
        );
        assert_eq!(
            external_path(Some(referrer), "side.asdf"),
            PathBuf::from("/data/run/side.asdf")
        );
        assert_eq!(external_path(None, "side.asdf"), PathBuf::from("side.asdf"));
    }

    #[test]
    fn test_missing_external() {
        let state = open();
        let err = state.external("does-not-exist-1d9f.asdf").unwrap_err();
        assert!(matches!(err, Error::ExternalOpen { .. }));
    }
}
