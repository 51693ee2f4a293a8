//! Node parsing

use super::array::parse_array_body;
use super::cursor::ByteCursor;
use super::entry::parse_entry;
use super::string::parse_string;
use crate::error::FormatError;
use crate::types::{Node, NodeTag};

/// Nesting limit for maps and lists
pub const MAX_DEPTH: usize = 256;

/// Parse a node
pub fn parse_node(cursor: &mut ByteCursor) -> Result<Node, FormatError> {
    parse_node_at(cursor, 0)
}

pub(super) fn parse_node_at(cursor: &mut ByteCursor, depth: usize) -> Result<Node, FormatError> {
    let position = cursor.position();
    let tag_byte = cursor.u8()?;
    let tag = NodeTag::from_u8(tag_byte).ok_or(FormatError::InvalidNodeTag {
        tag: tag_byte,
        position,
    })?;

    match tag {
        NodeTag::Null => Ok(Node::Null),
        NodeTag::Bool => Ok(Node::Bool(cursor.u8()? != 0)),
        NodeTag::Int => Ok(Node::Int(cursor.i64_le()?)),
        NodeTag::Float => Ok(Node::Float(cursor.f64_le()?)),
        NodeTag::String => Ok(Node::String(parse_string(cursor)?)),
        NodeTag::Array => Ok(Node::Array(parse_array_body(cursor)?)),
        NodeTag::Map | NodeTag::List if depth >= MAX_DEPTH => Err(FormatError::Malformed {
            message: "nesting too deep".into(),
            position,
        }),
        NodeTag::Map => {
            let n = cursor.u32_le()? as usize;
            // key length + tag is the smallest possible entry
            let entries = cursor.ntimes(n, 3, |c| parse_entry(c, depth + 1))?;
            Ok(Node::Map(entries))
        }
        NodeTag::List => {
            let n = cursor.u32_le()? as usize;
            let items = cursor.ntimes(n, 1, |c| parse_node_at(c, depth + 1))?;
            Ok(Node::List(items))
        }
    }
}
