//! Named entries

use super::{Group, Sequence, Table};
use crate::config::CopyOptions;
use crate::error::{Error, FormatError, Result};
use crate::ndarray::Ndarray;
use crate::reader::ReaderStateNode;
use crate::reference::Reference;
use crate::types::Node;
use crate::writer::BlockTable;

/// Payload of an entry; exactly one is active
#[derive(Debug, Clone, PartialEq)]
pub enum EntryPayload {
    Ndarray(Ndarray),
    Reference(Reference),
    Sequence(Sequence),
    Group(Group),
    Table(Table),
}

impl EntryPayload {
    /// Key the payload is stored under in an entry node
    pub fn key(&self) -> &'static str {
        match self {
            EntryPayload::Ndarray(_) => "data",
            EntryPayload::Reference(_) => "reference",
            EntryPayload::Sequence(_) => "sequence",
            EntryPayload::Group(_) => "group",
            EntryPayload::Table(_) => "table",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EntryPayload::Ndarray(_) => "ndarray",
            EntryPayload::Reference(_) => "reference",
            EntryPayload::Sequence(_) => "sequence",
            EntryPayload::Group(_) => "group",
            EntryPayload::Table(_) => "table",
        }
    }
}

/// A named payload with an optional annotation
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    name: String,
    payload: EntryPayload,
    annotation: String,
}

impl Entry {
    pub fn new(name: impl Into<String>, payload: EntryPayload, annotation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload,
            annotation: annotation.into(),
        }
    }

    pub fn create_from_ndarray(
        name: impl Into<String>,
        ndarray: Ndarray,
        annotation: impl Into<String>,
    ) -> Self {
        Self::new(name, EntryPayload::Ndarray(ndarray), annotation)
    }

    pub fn create_from_reference(
        name: impl Into<String>,
        reference: Reference,
        annotation: impl Into<String>,
    ) -> Self {
        Self::new(name, EntryPayload::Reference(reference), annotation)
    }

    pub fn create_from_sequence(
        name: impl Into<String>,
        sequence: Sequence,
        annotation: impl Into<String>,
    ) -> Self {
        Self::new(name, EntryPayload::Sequence(sequence), annotation)
    }

    pub fn create_from_group(
        name: impl Into<String>,
        group: Group,
        annotation: impl Into<String>,
    ) -> Self {
        Self::new(name, EntryPayload::Group(group), annotation)
    }

    pub fn create_from_table(
        name: impl Into<String>,
        table: Table,
        annotation: impl Into<String>,
    ) -> Self {
        Self::new(name, EntryPayload::Table(table), annotation)
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Annotation text; empty when none was given
    pub fn get_annotation(&self) -> &str {
        &self.annotation
    }

    pub fn payload(&self) -> &EntryPayload {
        &self.payload
    }

    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }

    pub fn get_ndarray(&self) -> Result<&Ndarray> {
        match &self.payload {
            EntryPayload::Ndarray(ndarray) => Ok(ndarray),
            other => Err(mismatch("ndarray", other)),
        }
    }

    pub fn get_reference(&self) -> Result<&Reference> {
        match &self.payload {
            EntryPayload::Reference(reference) => Ok(reference),
            other => Err(mismatch("reference", other)),
        }
    }

    pub fn get_sequence(&self) -> Result<&Sequence> {
        match &self.payload {
            EntryPayload::Sequence(sequence) => Ok(sequence),
            other => Err(mismatch("sequence", other)),
        }
    }

    pub fn get_group(&self) -> Result<&Group> {
        match &self.payload {
            EntryPayload::Group(group) => Ok(group),
            other => Err(mismatch("group", other)),
        }
    }

    pub fn get_table(&self) -> Result<&Table> {
        match &self.payload {
            EntryPayload::Table(table) => Ok(table),
            other => Err(mismatch("table", other)),
        }
    }

    /// Interpret an entry node read from a document
    pub fn read(node: &ReaderStateNode) -> Result<Self> {
        let map = node.node();
        if map.as_map().is_none() {
            return Err(Error::VariantMismatch {
                expected: "entry",
                actual: map.kind(),
            });
        }

        let name = map.get("name").and_then(Node::as_str).unwrap_or_default();
        let annotation = map
            .get("description")
            .and_then(Node::as_str)
            .unwrap_or_default();

        let payload = if let Some(child) = node.optional_child("data") {
            EntryPayload::Ndarray(Ndarray::read(&child)?)
        } else if let Some(child) = node.optional_child("reference") {
            EntryPayload::Reference(Reference::create_from_reader_state_node(&child)?)
        } else if let Some(child) = node.optional_child("sequence") {
            EntryPayload::Sequence(Sequence::read(&child)?)
        } else if let Some(child) = node.optional_child("group") {
            EntryPayload::Group(Group::read(&child)?)
        } else if let Some(child) = node.optional_child("table") {
            EntryPayload::Table(Table::read(&child)?)
        } else {
            return Err(FormatError::malformed(format!(
                "entry at /{} has no payload",
                node.path().join("/")
            ))
            .into());
        };

        Ok(Self::new(name, payload, annotation))
    }

    pub(crate) fn to_node(&self, blocks: &mut BlockTable) -> Result<Node> {
        let payload = match &self.payload {
            EntryPayload::Ndarray(ndarray) => ndarray.to_node(blocks)?,
            EntryPayload::Reference(reference) => reference.to_node(),
            EntryPayload::Sequence(sequence) => sequence.to_node(blocks)?,
            EntryPayload::Group(group) => group.to_node(blocks)?,
            EntryPayload::Table(table) => table.to_node(blocks)?,
        };

        let mut entries = vec![
            ("name".to_string(), Node::from(self.name.as_str())),
            (self.payload.key().to_string(), payload),
        ];
        if !self.annotation.is_empty() {
            entries.push(("description".to_string(), Node::from(self.annotation.as_str())));
        }
        Ok(Node::Map(entries))
    }

    /// Deep copy with array data materialized and `options` applied
    pub fn copy_with(&self, options: &CopyOptions) -> Result<Self> {
        let payload = match &self.payload {
            EntryPayload::Ndarray(ndarray) => EntryPayload::Ndarray(ndarray.copy_with(options)?),
            EntryPayload::Reference(reference) => {
                EntryPayload::Reference(Reference::from_target(reference.get_target()))
            }
            EntryPayload::Sequence(sequence) => EntryPayload::Sequence(sequence.copy_with(options)?),
            EntryPayload::Group(group) => EntryPayload::Group(group.copy_with(options)?),
            EntryPayload::Table(table) => EntryPayload::Table(table.copy_with(options)?),
        };
        Ok(Self::new(self.name.clone(), payload, self.annotation.clone()))
    }
}

fn mismatch(expected: &'static str, actual: &EntryPayload) -> Error {
    Error::VariantMismatch {
        expected,
        actual: actual.kind(),
    }
}
