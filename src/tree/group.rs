//! Groups: ordered maps from unique keys to entries

use super::Entry;
use crate::config::CopyOptions;
use crate::error::{Error, FormatError, Result};
use crate::reader::ReaderStateNode;
use crate::types::Node;
use crate::writer::BlockTable;

/// Entries keyed by unique names, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    entries: Vec<(String, Entry)>,
}

impl Group {
    /// Build a group; a repeated key fails with [`Error::DuplicateKey`]
    pub fn create<K, I>(mapping: I) -> Result<Self>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Entry)>,
    {
        let mut entries: Vec<(String, Entry)> = Vec::new();
        for (key, entry) in mapping {
            let key = key.into();
            if entries.iter().any(|(k, _)| *k == key) {
                return Err(Error::DuplicateKey(key));
            }
            entries.push((key, entry));
        }
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, entry)| entry)
    }

    pub fn get_entries(&self) -> &[(String, Entry)] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Interpret a group node read from a document
    pub fn read(node: &ReaderStateNode) -> Result<Self> {
        let map = node.node().as_map().ok_or(Error::VariantMismatch {
            expected: "group",
            actual: node.node().kind(),
        })?;

        let mut entries = Vec::with_capacity(map.len());
        for (key, _) in map {
            entries.push((key.clone(), Entry::read(&node.child(key)?)?));
        }
        Self::create(entries).map_err(|err| match err {
            Error::DuplicateKey(key) => FormatError::malformed(format!(
                "duplicate key {:?} in group at /{}",
                key,
                node.path().join("/")
            ))
            .into(),
            other => other,
        })
    }

    pub(crate) fn to_node(&self, blocks: &mut BlockTable) -> Result<Node> {
        let mut entries = Vec::with_capacity(self.entries.len());
        for (key, entry) in &self.entries {
            entries.push((key.clone(), entry.to_node(blocks)?));
        }
        Ok(Node::Map(entries))
    }

    pub fn copy_with(&self, options: &CopyOptions) -> Result<Self> {
        let mut entries = Vec::with_capacity(self.entries.len());
        for (key, entry) in &self.entries {
            entries.push((key.clone(), entry.copy_with(options)?));
        }
        Ok(Self { entries })
    }
}
