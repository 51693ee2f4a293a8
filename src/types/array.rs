//! Inline typed array stored directly in the structured section

use super::ElementType;
use bytes::Bytes;

/// Largest dimension count the encoding can hold
pub const MAX_NDIM: usize = u8::MAX as usize;

/// Typed array embedded in the tree.
///
/// When parsed from a document, `data` is a slice of the structured
/// section's buffer, not a copy.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineArray {
    pub dtype: ElementType,
    pub shape: Vec<u64>,
    pub data: Bytes,
}

impl InlineArray {
    pub fn new(dtype: ElementType, shape: Vec<u64>, data: impl Into<Bytes>) -> Self {
        Self {
            dtype,
            shape,
            data: data.into(),
        }
    }

    /// Total number of elements, `None` if the shape overflows `u64`
    pub fn num_elements(&self) -> Option<u64> {
        self.shape.iter().try_fold(1u64, |acc, &d| acc.checked_mul(d))
    }

    /// Expected data size in bytes, `None` on overflow
    pub fn expected_size(&self) -> Option<u64> {
        self.num_elements()?
            .checked_mul(self.dtype.element_size() as u64)
    }

    /// Whether the stored byte count agrees with dtype and shape
    pub fn is_consistent(&self) -> bool {
        self.expected_size() == Some(self.data.len() as u64)
    }
}
