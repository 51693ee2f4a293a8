//! Core types of the container format

mod array;
mod block;
mod dtype;
mod header;
mod node;

pub use array::{InlineArray, MAX_NDIM};
pub use block::{BlockDescriptor, NO_CHECKSUM};
pub use dtype::ElementType;
pub use header::{
    BLOCK_HEADER_BODY, BLOCK_HEADER_SIZE, BLOCK_MAGIC, HEADER_SIZE, Header, MAGIC, VERSION,
};
pub use node::{Node, NodeTag, Scalar};
