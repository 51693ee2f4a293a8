//! Node serialization

use super::array::write_array;
use crate::error::{Error, FormatError, Result};
use crate::types::{Node, NodeTag};
use std::io::Write;

/// Write a node and all of its children
pub fn write_node<W: Write>(writer: &mut W, node: &Node) -> Result<()> {
    match node {
        Node::Null => writer.write_all(&[NodeTag::Null as u8])?,
        Node::Bool(b) => writer.write_all(&[NodeTag::Bool as u8, u8::from(*b)])?,
        Node::Int(i) => {
            writer.write_all(&[NodeTag::Int as u8])?;
            writer.write_all(&i.to_le_bytes())?;
        }
        Node::Float(f) => {
            writer.write_all(&[NodeTag::Float as u8])?;
            writer.write_all(&f.to_le_bytes())?;
        }
        Node::String(s) => {
            writer.write_all(&[NodeTag::String as u8])?;
            let len = u32::try_from(s.len())
                .map_err(|_| FormatError::malformed("string longer than u32::MAX bytes"))?;
            writer.write_all(&len.to_le_bytes())?;
            writer.write_all(s.as_bytes())?;
        }
        Node::Array(arr) => write_array(writer, arr)?,
        Node::Map(entries) => {
            writer.write_all(&[NodeTag::Map as u8])?;
            writer.write_all(&(entries.len() as u32).to_le_bytes())?;
            for (key, val) in entries {
                write_key(writer, key)?;
                write_node(writer, val)?;
            }
        }
        Node::List(items) => {
            writer.write_all(&[NodeTag::List as u8])?;
            writer.write_all(&(items.len() as u32).to_le_bytes())?;
            for item in items {
                write_node(writer, item)?;
            }
        }
    }
    Ok(())
}

fn write_key<W: Write>(writer: &mut W, key: &str) -> Result<()> {
    if key.contains('/') {
        return Err(Error::InvalidKey(key.to_string()));
    }
    let len = u16::try_from(key.len()).map_err(|_| Error::InvalidKey(key.to_string()))?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(key.as_bytes())?;
    Ok(())
}
