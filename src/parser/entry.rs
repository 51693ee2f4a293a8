//! Map entry parsing

use super::cursor::ByteCursor;
use super::node::parse_node_at;
use super::string::parse_key;
use crate::error::FormatError;
use crate::types::Node;

/// Parse a single map entry (key + node)
pub(super) fn parse_entry(
    cursor: &mut ByteCursor,
    depth: usize,
) -> Result<(String, Node), FormatError> {
    let position = cursor.position();
    let key = parse_key(cursor)?;
    if key.contains('/') {
        return Err(FormatError::Malformed {
            message: format!("map key contains '/': {:?}", key).into(),
            position,
        });
    }
    let node = parse_node_at(cursor, depth)?;
    Ok((key, node))
}
