//! References to nodes in this or another document
//!
//! A reference is stored as a single target string
//! `<external-path>#/<segment>/<segment>...`. Segments are escaped the way
//! JSON pointers are (`~` as `~0`, `/` as `~1`) and then percent-encoded.
//! Components of the external path are percent-encoded too, so a `#` in a
//! file name never splits the target. An empty external path designates
//! the document that holds the reference.

use crate::config::ReadOptions;
use crate::error::{Error, FormatError, Result};
use crate::reader::{self, ReaderState, ReaderStateNode};
use crate::types::Node;
use std::path::Path;
use std::sync::Arc;
use tracing::trace;

/// Key holding the target string of a reference node
pub const REF_KEY: &str = "$ref";

/// A designator of a node, resolved lazily
#[derive(Debug, Clone)]
pub struct Reference {
    target: String,
    /// Document the reference was read from; local targets resolve there
    origin: Option<Arc<ReaderState>>,
}

impl Reference {
    /// Reference to `segments` below the root of `external_path`, or of the
    /// containing document when `external_path` is empty
    pub fn create_from_path<S: AsRef<str>>(external_path: &str, segments: &[S]) -> Self {
        let external = external_path
            .split('/')
            .map(urlencoding::encode)
            .collect::<Vec<_>>()
            .join("/");
        let mut target = external + "#";
        for segment in segments {
            target.push('/');
            target.push_str(&urlencoding::encode(&tilde_encode(segment.as_ref())));
        }
        Self {
            target,
            origin: None,
        }
    }

    /// Reference from a raw target string; validated when resolved
    pub fn from_target(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            origin: None,
        }
    }

    /// Interpret a `{"$ref": target}` node read from a document
    pub fn create_from_reader_state_node(node: &ReaderStateNode) -> Result<Self> {
        let target = node
            .node()
            .get(REF_KEY)
            .and_then(Node::as_str)
            .ok_or(Error::VariantMismatch {
                expected: "reference",
                actual: node.node().kind(),
            })?;
        Ok(Self {
            target: target.to_string(),
            origin: Some(Arc::clone(node.state())),
        })
    }

    pub fn get_target(&self) -> &str {
        &self.target
    }

    /// Split the target into the external path and the decoded segments
    pub fn split_target(&self) -> Result<(String, Vec<String>)> {
        let Some((external, fragment)) = self.target.split_once('#') else {
            return Ok((percent_decode(&self.target)?, Vec::new()));
        };

        let segments = match fragment.strip_prefix('/') {
            Some(rest) => rest
                .split('/')
                .map(|segment| tilde_decode(&percent_decode(segment)?))
                .collect::<Result<Vec<_>>>()?,
            None if fragment.is_empty() => Vec::new(),
            None => {
                return Err(FormatError::malformed(format!(
                    "reference fragment must start with '/': {:?}",
                    self.target
                ))
                .into());
            }
        };
        Ok((percent_decode(external)?, segments))
    }

    /// Resolve to the designated node.
    ///
    /// Resolution is a single hop: when the designated node is itself a
    /// reference the caller decides whether to follow it.
    pub fn resolve(&self) -> Result<ReaderStateNode> {
        let (external, segments) = self.split_target()?;
        trace!(target = %self.target, "resolving reference");

        let state = match (&self.origin, external.is_empty()) {
            (Some(origin), true) => Arc::clone(origin),
            (Some(origin), false) => origin.external(&external)?,
            (None, true) => return Err(Error::UnboundReference(self.target.clone())),
            (None, false) => {
                let path = reader::external_path(None, &external);
                reader::open_external(&path, ReadOptions::default())?
            }
        };
        state.resolve_path(&segments)
    }

    /// Document this reference was read from, if any
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_ref().and_then(|state| state.path())
    }

    pub(crate) fn to_node(&self) -> Node {
        Node::Map(vec![(REF_KEY.to_string(), Node::String(self.target.clone()))])
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
    }
}

fn tilde_encode(raw: &str) -> String {
    raw.replace('~', "~0").replace('/', "~1")
}

fn tilde_decode(cooked: &str) -> Result<String> {
    let mut out = String::with_capacity(cooked.len());
    let mut chars = cooked.chars();
    while let Some(ch) = chars.next() {
        if ch != '~' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            other => {
                return Err(FormatError::malformed(format!(
                    "invalid escape '~{}' in reference segment {:?}",
                    other.map(String::from).unwrap_or_default(),
                    cooked
                ))
                .into());
            }
        }
    }
    Ok(out)
}

fn percent_decode(cooked: &str) -> Result<String> {
    urlencoding::decode(cooked)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| FormatError::malformed(format!("reference target is not UTF-8: {:?}", cooked)).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_target() {
        let r = Reference::create_from_path("", &["group", "alpha", "data"]);
        assert_eq!(r.get_target(), "#/group/alpha/data");
        let (external, segments) = r.split_target().unwrap();
        assert!(external.is_empty());
        assert_eq!(segments, ["group", "alpha", "data"]);
    }

    #[test]
    fn test_external_target() {
        let r = Reference::create_from_path("metadata.asdf", &["group", "epsilon"]);
        assert_eq!(r.get_target(), "metadata.asdf#/group/epsilon");
        assert_eq!(r.split_target().unwrap().0, "metadata.asdf");
    }

    #[test]
    fn test_escaped_segments() {
        let segments = ["a/b", "~home", "two words", "ü", "100%"];
        let r = Reference::create_from_path("", &segments);
        assert_eq!(
            r.get_target(),
            "#/a~1b/~0home/two%20words/%C3%BC/100%25"
        );
        assert_eq!(r.split_target().unwrap().1, segments);
    }

    #[test]
    fn test_external_path_with_hash() {
        let r = Reference::create_from_path("run#1/ext 100%.asdf", &["group", "alpha"]);
        assert_eq!(r.get_target(), "run%231/ext%20100%25.asdf#/group/alpha");
        let (external, segments) = r.split_target().unwrap();
        assert_eq!(external, "run#1/ext 100%.asdf");
        assert_eq!(segments, ["group", "alpha"]);
    }

    #[test]
    fn test_empty_path_designates_root() {
        let r = Reference::create_from_path::<&str>("other.asdf", &[]);
        assert_eq!(r.get_target(), "other.asdf#");
        assert!(r.split_target().unwrap().1.is_empty());

        let bare = Reference::from_target("other.asdf");
        assert_eq!(bare.split_target().unwrap(), ("other.asdf".to_string(), Vec::new()));
    }

    #[test]
    fn test_malformed_targets() {
        for target in ["#group", "#/a~2", "#/%FF", "%C3#/group"] {
            let r = Reference::from_target(target);
            assert!(
                matches!(r.split_target(), Err(Error::Format(_))),
                "{} should be rejected",
                target
            );
        }
    }

    #[test]
    fn test_unbound_local_reference() {
        let r = Reference::create_from_path("", &["group"]);
        assert!(matches!(r.resolve(), Err(Error::UnboundReference(_))));
    }

    #[test]
    fn test_missing_external_document() {
        let r = Reference::create_from_path("no-such-document-7c2e.asdf", &["group"]);
        assert!(matches!(r.resolve(), Err(Error::ExternalOpen { .. })));
    }

    #[test]
    fn test_node_form() {
        let r = Reference::create_from_path("x.asdf", &["group"]);
        let node = r.to_node();
        assert!(node.is_reference());
        assert_eq!(node.get(REF_KEY).and_then(Node::as_str), Some("x.asdf#/group"));
    }
}
