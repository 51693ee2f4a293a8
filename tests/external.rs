//! Cross-file references
//!
//! `external.asdf` holds the data, `metadata.asdf` only points at it.

use asdf::{
    Codec, Document, Entry, Error, Group, Ndarray, Placement, Reference, ReaderStateNode, Scalar,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn no_metadata() -> Vec<(String, Scalar)> {
    Vec::new()
}

fn write_external(dir: &Path) {
    let alpha = Ndarray::create_int64(&[1, 2, 3], Placement::Block, Codec::Zlib, 6, &[], &[3]).unwrap();
    let beta = Reference::create_from_path("", &["group", "alpha", "data"]);
    let group = Group::create([
        ("alpha", Entry::create_from_ndarray("alpha", alpha, "the dataset")),
        ("beta", Entry::create_from_reference("beta", beta, "local reference")),
    ])
    .unwrap();
    Document::create_from_group(no_metadata(), group)
        .write(dir.join("external.asdf"))
        .unwrap();
}

fn write_metadata(dir: &Path) {
    let gamma = Reference::create_from_path("external.asdf", &["group", "alpha", "data"]);
    let delta = Reference::create_from_path("", &["group", "gamma", "reference"]);
    let epsilon = Reference::create_from_path("external.asdf", &["group", "beta", "reference"]);
    let group = Group::create([
        ("gamma", Entry::create_from_reference("gamma", gamma, "remote")),
        ("delta", Entry::create_from_reference("delta", delta, "local to remote")),
        ("epsilon", Entry::create_from_reference("epsilon", epsilon, "remote to local")),
    ])
    .unwrap();
    Document::create_from_group(no_metadata(), group)
        .write(dir.join("metadata.asdf"))
        .unwrap();
}

fn setup() -> (TempDir, Document) {
    let dir = TempDir::new().unwrap();
    write_external(dir.path());
    write_metadata(dir.path());
    let doc = Document::read(dir.path().join("metadata.asdf")).unwrap();
    (dir, doc)
}

fn reference<'a>(doc: &'a Document, name: &str) -> &'a Reference {
    doc.get_group().get(name).unwrap().get_reference().unwrap()
}

fn values(node: &ReaderStateNode) -> Vec<i64> {
    Ndarray::read(node).unwrap().get_data_vector_int64().unwrap()
}

#[test]
fn remote_reference_resolves_directly() {
    let (_dir, doc) = setup();
    let gamma = reference(&doc, "gamma");
    assert_eq!(gamma.get_target(), "external.asdf#/group/alpha/data");

    let node = gamma.resolve().unwrap();
    assert!(node.state().path().unwrap().ends_with("external.asdf"));
    assert_eq!(values(&node), vec![1, 2, 3]);
}

#[test]
fn local_reference_to_remote_reference() {
    let (_dir, doc) = setup();
    let node = reference(&doc, "delta").resolve().unwrap();
    assert!(node.is_reference());

    let hop = Reference::create_from_reader_state_node(&node).unwrap();
    assert_eq!(hop.get_target(), "external.asdf#/group/alpha/data");
    assert_eq!(values(&hop.resolve().unwrap()), vec![1, 2, 3]);
}

#[test]
fn two_hop_chain() {
    let (_dir, doc) = setup();
    let node = reference(&doc, "epsilon").resolve().unwrap();
    assert!(Ndarray::read(&node).is_err());

    // The intermediate reference is local to external.asdf.
    let hop = Reference::create_from_reader_state_node(&node).unwrap();
    assert_eq!(hop.get_target(), "#/group/alpha/data");
    assert!(hop.origin().unwrap().ends_with("external.asdf"));
    assert_eq!(values(&hop.resolve().unwrap()), vec![1, 2, 3]);
}

#[test]
fn external_documents_are_cached() {
    let (_dir, doc) = setup();
    let first = reference(&doc, "gamma").resolve().unwrap();
    let second = reference(&doc, "epsilon").resolve().unwrap();
    assert!(Arc::ptr_eq(first.state(), second.state()));

    // Blocks materialized through one handle are shared with the other.
    values(&first);
    let alpha = Ndarray::read(&second.state().resolve_path(&["group".into(), "alpha".into(), "data".into()]).unwrap()).unwrap();
    assert!(alpha.is_materialized());
}

#[test]
fn external_state_outlives_document() {
    let (_dir, doc) = setup();
    let node = reference(&doc, "gamma").resolve().unwrap();
    drop(doc);
    assert_eq!(values(&node), vec![1, 2, 3]);
}

#[test]
fn remote_path_failures() {
    let dir = TempDir::new().unwrap();
    write_external(dir.path());

    let broken = [
        ("missing", Reference::create_from_path("external.asdf", &["group", "zeta"])),
        ("index", Reference::create_from_path("external.asdf", &["group", "alpha", "data", "shape", "x"])),
        ("nofile", Reference::create_from_path("absent.asdf", &["group"])),
    ];
    let group = Group::create(
        broken
            .into_iter()
            .map(|(name, r)| (name, Entry::create_from_reference(name, r, ""))),
    )
    .unwrap();
    Document::create_from_group(no_metadata(), group)
        .write(dir.path().join("broken.asdf"))
        .unwrap();

    let doc = Document::read(dir.path().join("broken.asdf")).unwrap();
    assert!(matches!(
        reference(&doc, "missing").resolve(),
        Err(Error::UnresolvedPath { segment, .. }) if segment == "zeta"
    ));
    assert!(matches!(
        reference(&doc, "index").resolve(),
        Err(Error::PathType { kind: "list", .. })
    ));
    match reference(&doc, "nofile").resolve() {
        Err(Error::ExternalOpen { path, source }) => {
            assert!(path.ends_with("absent.asdf"));
            assert!(matches!(*source, Error::Io(_)));
        }
        other => panic!("expected ExternalOpen, got {:?}", other),
    }
}

#[test]
fn unread_reference_resolves_external_targets() {
    let dir = TempDir::new().unwrap();
    write_external(dir.path());

    let path = dir.path().join("external.asdf");
    let target = format!("file://{}", path.display());
    let reference = Reference::create_from_path(&target, &["group", "alpha", "data"]);
    assert_eq!(values(&reference.resolve().unwrap()), vec![1, 2, 3]);
}
