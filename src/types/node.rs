//! Structured section nodes

use super::InlineArray;

/// Node type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeTag {
    Null = 0x00,
    Bool = 0x01,
    Int = 0x02,
    Float = 0x03,
    String = 0x04,
    Array = 0x05,
    Map = 0x07,
    List = 0x08,
}

impl NodeTag {
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0x00 => Some(NodeTag::Null),
            0x01 => Some(NodeTag::Bool),
            0x02 => Some(NodeTag::Int),
            0x03 => Some(NodeTag::Float),
            0x04 => Some(NodeTag::String),
            0x05 => Some(NodeTag::Array),
            0x07 => Some(NodeTag::Map),
            0x08 => Some(NodeTag::List),
            _ => None,
        }
    }

    /// Human readable kind, used in error messages
    pub fn kind(self) -> &'static str {
        match self {
            NodeTag::Null => "null",
            NodeTag::Bool => "bool",
            NodeTag::Int => "int",
            NodeTag::Float => "float",
            NodeTag::String => "string",
            NodeTag::Array => "inline array",
            NodeTag::Map => "map",
            NodeTag::List => "list",
        }
    }
}

/// A node of the structured section.
///
/// Maps keep insertion order; reference paths address map children by key
/// and list children by index.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(InlineArray),
    Map(Vec<(String, Node)>),
    List(Vec<Node>),
}

impl Node {
    /// Get the tag for this node
    pub fn tag(&self) -> NodeTag {
        match self {
            Node::Null => NodeTag::Null,
            Node::Bool(_) => NodeTag::Bool,
            Node::Int(_) => NodeTag::Int,
            Node::Float(_) => NodeTag::Float,
            Node::String(_) => NodeTag::String,
            Node::Array(_) => NodeTag::Array,
            Node::Map(_) => NodeTag::Map,
            Node::List(_) => NodeTag::List,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.tag().kind()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Node::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Node::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&InlineArray> {
        match self {
            Node::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(String, Node)]> {
        match self {
            Node::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(l) => Some(l),
            _ => None,
        }
    }

    /// Look up a direct child of a map node by key
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Whether the node is a map holding a `$ref` key
    pub fn is_reference(&self) -> bool {
        self.get("$ref").is_some()
    }
}

impl From<bool> for Node {
    fn from(v: bool) -> Self {
        Node::Bool(v)
    }
}

impl From<i64> for Node {
    fn from(v: i64) -> Self {
        Node::Int(v)
    }
}

impl From<f64> for Node {
    fn from(v: f64) -> Self {
        Node::Float(v)
    }
}

impl From<String> for Node {
    fn from(v: String) -> Self {
        Node::String(v)
    }
}

impl From<&str> for Node {
    fn from(v: &str) -> Self {
        Node::String(v.to_string())
    }
}

impl From<InlineArray> for Node {
    fn from(v: InlineArray) -> Self {
        Node::Array(v)
    }
}

/// Scalar value allowed in document metadata
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    pub fn to_node(&self) -> Node {
        match self {
            Scalar::Bool(b) => Node::Bool(*b),
            Scalar::Int(i) => Node::Int(*i),
            Scalar::Float(f) => Node::Float(*f),
            Scalar::String(s) => Node::String(s.clone()),
        }
    }

    /// Convert back from a node; `None` if the node is not a scalar
    pub fn from_node(node: &Node) -> Option<Self> {
        match node {
            Node::Bool(b) => Some(Scalar::Bool(*b)),
            Node::Int(i) => Some(Scalar::Int(*i)),
            Node::Float(f) => Some(Scalar::Float(*f)),
            Node::String(s) => Some(Scalar::String(s.clone())),
            _ => None,
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::String(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::String(v.to_string())
    }
}
