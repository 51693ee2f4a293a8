//! Tables: named array columns

use crate::config::CopyOptions;
use crate::error::{Error, FormatError, Result};
use crate::ndarray::Ndarray;
use crate::reader::ReaderStateNode;
use crate::types::Node;
use crate::writer::BlockTable;

/// One named array column of a [`Table`]
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: Ndarray,
    description: String,
}

impl Column {
    pub fn new(name: impl Into<String>, data: Ndarray, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data,
            description: description.into(),
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_data(&self) -> &Ndarray {
        &self.data
    }

    /// Description text; empty when none was given
    pub fn get_description(&self) -> &str {
        &self.description
    }

    fn read(node: &ReaderStateNode) -> Result<Self> {
        let name = node
            .node()
            .get("name")
            .and_then(Node::as_str)
            .ok_or_else(|| {
                FormatError::malformed(format!("column at /{} has no name", node.path().join("/")))
            })?;
        let description = node
            .node()
            .get("description")
            .and_then(Node::as_str)
            .unwrap_or_default();
        let data = Ndarray::read(&node.child("data")?)?;
        Ok(Self::new(name, data, description))
    }

    fn to_node(&self, blocks: &mut BlockTable) -> Result<Node> {
        let mut entries = vec![
            ("name".to_string(), Node::from(self.name.as_str())),
            ("data".to_string(), self.data.to_node(blocks)?),
        ];
        if !self.description.is_empty() {
            entries.push(("description".to_string(), Node::from(self.description.as_str())));
        }
        Ok(Node::Map(entries))
    }
}

/// Columns in order; names are unique and non-empty
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table; an empty or repeated column name fails with
    /// [`Error::InvalidKey`] or [`Error::DuplicateKey`]
    pub fn create(columns: Vec<Column>) -> Result<Self> {
        for (i, column) in columns.iter().enumerate() {
            if column.name.is_empty() {
                return Err(Error::InvalidKey(column.name.clone()));
            }
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(Error::DuplicateKey(column.name.clone()));
            }
        }
        Ok(Self { columns })
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn get_columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Interpret a table node read from a document
    pub fn read(node: &ReaderStateNode) -> Result<Self> {
        if node.node().as_map().is_none() {
            return Err(Error::VariantMismatch {
                expected: "table",
                actual: node.node().kind(),
            });
        }
        let columns_node = node.child("columns")?;
        let count = columns_node.node().as_list().map(<[Node]>::len).ok_or_else(|| {
            FormatError::malformed(format!("table at /{} has no column list", node.path().join("/")))
        })?;

        let columns = (0..count)
            .map(|i| Column::read(&columns_node.child(&i.to_string())?))
            .collect::<Result<Vec<_>>>()?;
        Self::create(columns).map_err(|err| match err {
            Error::DuplicateKey(name) | Error::InvalidKey(name) => FormatError::malformed(format!(
                "bad column name {:?} in table at /{}",
                name,
                node.path().join("/")
            ))
            .into(),
            other => other,
        })
    }

    pub(crate) fn to_node(&self, blocks: &mut BlockTable) -> Result<Node> {
        let columns = self
            .columns
            .iter()
            .map(|column| column.to_node(blocks))
            .collect::<Result<Vec<_>>>()?;
        Ok(Node::Map(vec![("columns".to_string(), Node::List(columns))]))
    }

    pub fn copy_with(&self, options: &CopyOptions) -> Result<Self> {
        let columns = self
            .columns
            .iter()
            .map(|c| -> Result<Column> {
                Ok(Column::new(c.name.clone(), c.data.copy_with(options)?, c.description.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns })
    }
}
