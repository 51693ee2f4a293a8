//! Sequences: index-addressed lists of entries

use super::Entry;
use crate::config::CopyOptions;
use crate::error::{Error, Result};
use crate::reader::ReaderStateNode;
use crate::types::Node;
use crate::writer::BlockTable;

/// An ordered list of entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence {
    entries: Vec<Entry>,
}

impl Sequence {
    pub fn create(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn get_entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Interpret a sequence node read from a document
    pub fn read(node: &ReaderStateNode) -> Result<Self> {
        let items = node.node().as_list().ok_or(Error::VariantMismatch {
            expected: "sequence",
            actual: node.node().kind(),
        })?;

        let entries = (0..items.len())
            .map(|i| Entry::read(&node.child(&i.to_string())?))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    pub(crate) fn to_node(&self, blocks: &mut BlockTable) -> Result<Node> {
        let items = self
            .entries
            .iter()
            .map(|entry| entry.to_node(blocks))
            .collect::<Result<Vec<_>>>()?;
        Ok(Node::List(items))
    }

    pub fn copy_with(&self, options: &CopyOptions) -> Result<Self> {
        let entries = self
            .entries
            .iter()
            .map(|entry| entry.copy_with(options))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
