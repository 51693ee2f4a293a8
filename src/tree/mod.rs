//! Document tree: groups, entries, sequences and tables
//!
//! Every structure is immutable once built. Converting a tree to nodes
//! appends the data of block-placed arrays to a [`BlockTable`]; reading it
//! back goes through [`ReaderStateNode`] handles so that arrays and
//! references stay tied to the document they came from.
//!
//! [`BlockTable`]: crate::writer::BlockTable
//! [`ReaderStateNode`]: crate::reader::ReaderStateNode

mod entry;
mod group;
mod sequence;
mod table;

pub use entry::{Entry, EntryPayload};
pub use group::Group;
pub use sequence::Sequence;
pub use table::{Column, Table};
