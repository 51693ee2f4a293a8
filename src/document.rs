//! Documents: a root group plus metadata, and their file form

use crate::config::{CopyOptions, ReadOptions, WriteOptions};
use crate::error::{Error, FormatError, Result};
use crate::reader::{ReaderState, ReaderStateNode};
use crate::tree::Group;
use crate::types::{Node, Scalar};
use crate::writer::{self, BlockTable};
use bytes::Bytes;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// A container document
#[derive(Debug, Clone)]
pub struct Document {
    metadata: Vec<(String, Scalar)>,
    group: Group,
    /// Present when the document was read; keeps lazily loaded blocks and
    /// external documents reachable
    state: Option<Arc<ReaderState>>,
}

impl Document {
    /// Document holding `group`. A metadata key given twice keeps the last
    /// value at the position of the first.
    pub fn create_from_group<K, I>(metadata: I, group: Group) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Scalar)>,
    {
        let mut entries: Vec<(String, Scalar)> = Vec::new();
        for (key, value) in metadata {
            let key = key.into();
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some((_, slot)) => *slot = value,
                None => entries.push((key, value)),
            }
        }
        Self {
            metadata: entries,
            group,
            state: None,
        }
    }

    /// Read a document file with default options
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        Self::read_with(path, ReadOptions::default())
    }

    pub fn read_with(path: impl AsRef<Path>, options: ReadOptions) -> Result<Self> {
        Self::from_state(ReaderState::open(path, options)?)
    }

    /// Parse a document from memory
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self> {
        Self::from_bytes_with(bytes, ReadOptions::default())
    }

    pub fn from_bytes_with(bytes: impl Into<Bytes>, options: ReadOptions) -> Result<Self> {
        Self::from_state(ReaderState::from_bytes(bytes, options)?)
    }

    fn from_state(state: Arc<ReaderState>) -> Result<Self> {
        let root = state.root_node();

        let mut metadata = Vec::new();
        if let Some(node) = root.node().get("metadata") {
            let map = node
                .as_map()
                .ok_or_else(|| FormatError::malformed("document metadata is not a map"))?;
            for (key, value) in map {
                match Scalar::from_node(value) {
                    Some(scalar) => metadata.push((key.clone(), scalar)),
                    None => warn!(key = %key, kind = value.kind(), "skipping non-scalar metadata"),
                }
            }
        }

        let group = match root.optional_child("group") {
            Some(node) => Group::read(&node)?,
            None => Group::default(),
        };

        Ok(Self {
            metadata,
            group,
            state: Some(state),
        })
    }

    pub fn metadata(&self) -> &[(String, Scalar)] {
        &self.metadata
    }

    pub fn get_metadata(&self, key: &str) -> Option<&Scalar> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn get_group(&self) -> &Group {
        &self.group
    }

    /// Reader state of a document that was read
    pub fn reader_state(&self) -> Option<&Arc<ReaderState>> {
        self.state.as_ref()
    }

    /// Handle on the root node of a document that was read
    pub fn root_node(&self) -> Option<ReaderStateNode> {
        self.state.as_ref().map(ReaderState::root_node)
    }

    fn to_node(&self, blocks: &mut BlockTable) -> Result<Node> {
        let library = Node::Map(vec![
            ("name".to_string(), Node::from(env!("CARGO_PKG_NAME"))),
            ("version".to_string(), Node::from(env!("CARGO_PKG_VERSION"))),
            ("homepage".to_string(), Node::from(env!("CARGO_PKG_HOMEPAGE"))),
        ]);
        let metadata = Node::Map(
            self.metadata
                .iter()
                .map(|(k, v)| (k.clone(), v.to_node()))
                .collect(),
        );
        Ok(Node::Map(vec![
            ("asdf_library".to_string(), library),
            ("metadata".to_string(), metadata),
            ("group".to_string(), self.group.to_node(blocks)?),
        ]))
    }

    /// Encode the tree and all blocks; nothing is written on failure
    fn encode(&self, options: WriteOptions) -> Result<(Node, BlockTable)> {
        let mut blocks = BlockTable::new(options);
        let root = self.to_node(&mut blocks)?;
        Ok((root, blocks))
    }

    /// Write the file form to `writer`
    pub fn write_to<W: Write>(&self, writer: &mut W, options: WriteOptions) -> Result<()> {
        let (root, blocks) = self.encode(options)?;
        writer::write(writer, &root, blocks.blocks())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf, WriteOptions::default())?;
        Ok(buf)
    }

    /// Write to `path` with default options
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        self.write_with(path, WriteOptions::default())
    }

    /// Write to `path` atomically: the file appears complete or not at all
    pub fn write_with(&self, path: impl AsRef<Path>, options: WriteOptions) -> Result<()> {
        let path = path.as_ref();
        let (root, blocks) = self.encode(options)?;

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let tmp = NamedTempFile::new_in(dir)?;
        let mut out = BufWriter::new(tmp);
        writer::write(&mut out, &root, blocks.blocks())?;
        let tmp = out.into_inner().map_err(|e| Error::Io(e.into_error()))?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;

        debug!(
            path = %path.display(),
            blocks = blocks.len(),
            entries = self.group.len(),
            "wrote document"
        );
        Ok(())
    }

    /// Independent copy with all array data in memory and `options` applied.
    /// References are copied as their target strings.
    pub fn copy(&self, options: &CopyOptions) -> Result<Self> {
        Ok(Self {
            metadata: self.metadata.clone(),
            group: self.group.copy_with(options)?,
            state: None,
        })
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.metadata == other.metadata && self.group == other.group
    }
}
