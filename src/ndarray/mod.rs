//! Typed N-dimensional arrays
//!
//! An [`Ndarray`] carries its element type, shape, placement and codec next
//! to the raw little-endian element bytes in row-major order. Arrays read
//! from a document with block placement only record where their block is;
//! the payload is read, verified and decompressed on first access.
//! Big-endian data in a document is converted when it is read.

mod element;

pub use element::{ByteOrder, Element, decode_elements, encode_elements, to_little_endian};

use crate::codec::Codec;
use crate::config::CopyOptions;
use crate::error::{Error, FormatError, Result};
use crate::reader::{ReaderState, ReaderStateNode};
use crate::types::{ElementType, InlineArray, MAX_NDIM, Node};
use crate::writer::BlockTable;
use bytes::Bytes;
use num_complex::{Complex32, Complex64};
use std::sync::Arc;

/// Where the element data of an array is stored in a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Placement {
    /// In the structured section, next to the descriptor
    #[default]
    Inline,
    /// In a separate, optionally compressed block section
    Block,
}

#[derive(Debug, Clone)]
enum ArrayData {
    Owned(Bytes),
    Located {
        state: Arc<ReaderState>,
        index: usize,
        order: ByteOrder,
    },
}

/// A typed N-dimensional array
#[derive(Debug, Clone)]
pub struct Ndarray {
    dtype: ElementType,
    shape: Vec<u64>,
    placement: Placement,
    codec: Codec,
    level: u32,
    data: ArrayData,
}

/// Number of elements described by `shape`; an empty shape is a scalar
fn element_count(shape: &[u64]) -> Option<u64> {
    shape.iter().try_fold(1u64, |acc, &d| acc.checked_mul(d))
}

/// Shapes must be writable: at most `MAX_NDIM` dimensions, each fitting `i64`
fn check_shape(shape: &[u64]) -> Result<()> {
    if shape.len() > MAX_NDIM {
        return Err(Error::shape(
            shape,
            format!("{} dimensions, at most {} supported", shape.len(), MAX_NDIM),
        ));
    }
    if let Some(dim) = shape.iter().find(|&&d| i64::try_from(d).is_err()) {
        return Err(Error::shape(shape, format!("dimension {} exceeds i64::MAX", dim)));
    }
    Ok(())
}

fn expected_bytes(dtype: ElementType, shape: &[u64]) -> Result<usize> {
    element_count(shape)
        .and_then(|n| n.checked_mul(dtype.element_size() as u64))
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| Error::shape(shape, "element count overflows"))
}

impl Ndarray {
    /// Create an array from raw little-endian row-major bytes
    pub fn create(
        dtype: ElementType,
        shape: Vec<u64>,
        placement: Placement,
        codec: Codec,
        level: u32,
        raw: impl Into<Bytes>,
    ) -> Result<Self> {
        let raw = raw.into();
        check_shape(&shape)?;
        let expected = expected_bytes(dtype, &shape)?;
        if raw.len() != expected {
            return Err(Error::shape(
                &shape,
                format!(
                    "{} data needs {} bytes, got {}",
                    dtype,
                    expected,
                    raw.len()
                ),
            ));
        }
        Ok(Self {
            dtype,
            shape,
            placement,
            codec,
            level,
            data: ArrayData::Owned(raw),
        })
    }

    /// Create an array from typed elements.
    ///
    /// `strides` are in bytes per dimension. Empty strides or row-major
    /// strides take `data` as is; column-major strides reorder `data` into
    /// row-major storage. Other layouts are rejected.
    pub fn from_elements<T: Element>(
        data: &[T],
        placement: Placement,
        codec: Codec,
        level: u32,
        strides: &[i64],
        shape: &[u64],
    ) -> Result<Self> {
        let count = element_count(shape).ok_or_else(|| Error::shape(shape, "element count overflows"))?;
        if data.len() as u64 != count {
            return Err(Error::shape(
                shape,
                format!("expected {} elements, got {}", count, data.len()),
            ));
        }

        let raw = match layout(shape, strides, T::DTYPE.element_size())? {
            Layout::RowMajor => encode_elements(data),
            Layout::ColumnMajor => encode_elements(&column_to_row_major(data, shape)),
        };
        Self::create(T::DTYPE, shape.to_vec(), placement, codec, level, raw)
    }

    /// Interpret an ndarray descriptor node read from a document
    pub fn read(node: &ReaderStateNode) -> Result<Self> {
        let map = node.node();
        if map.as_map().is_none() {
            return Err(Error::VariantMismatch {
                expected: "ndarray",
                actual: map.kind(),
            });
        }

        let dtype = map
            .get("datatype")
            .and_then(Node::as_str)
            .and_then(ElementType::from_name)
            .ok_or_else(|| malformed(node, "missing or unknown datatype"))?;

        let order = match map.get("byteorder").and_then(Node::as_str) {
            None => ByteOrder::Little,
            Some(name) => ByteOrder::from_name(name)
                .ok_or_else(|| malformed(node, &format!("unsupported byteorder {:?}", name)))?,
        };

        let shape = map
            .get("shape")
            .and_then(Node::as_list)
            .ok_or_else(|| malformed(node, "missing shape"))?
            .iter()
            .map(|d| d.as_int().and_then(|d| u64::try_from(d).ok()))
            .collect::<Option<Vec<u64>>>()
            .ok_or_else(|| malformed(node, "shape must hold non-negative integers"))?;

        let codec = match map.get("compression").and_then(Node::as_str) {
            None => Codec::None,
            Some(name) => Codec::from_name(name)
                .ok_or_else(|| malformed(node, &format!("unknown compression {:?}", name)))?,
        };
        let level = match map.get("compression_level").and_then(Node::as_int) {
            None => 0,
            Some(level) => u32::try_from(level)
                .map_err(|_| malformed(node, "negative compression level"))?,
        };

        if let Some(Node::Array(inline)) = map.get("data") {
            if inline.dtype != dtype || inline.shape != shape {
                return Err(malformed(node, "inline data disagrees with the descriptor"));
            }
            let raw = to_little_endian(dtype, order, inline.data.clone());
            return Self::create(dtype, shape, Placement::Inline, codec, level, raw);
        }

        let index = map
            .get("source")
            .and_then(Node::as_int)
            .and_then(|i| usize::try_from(i).ok())
            .ok_or_else(|| malformed(node, "ndarray has neither inline data nor a source block"))?;
        if index >= node.state().block_count() {
            return Err(malformed(
                node,
                &format!("source block {} does not exist", index),
            ));
        }
        check_shape(&shape)?;
        expected_bytes(dtype, &shape)?;

        Ok(Self {
            dtype,
            shape,
            placement: Placement::Block,
            codec,
            level,
            data: ArrayData::Located {
                state: Arc::clone(node.state()),
                index,
                order,
            },
        })
    }

    pub fn element_type(&self) -> ElementType {
        self.dtype
    }

    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn num_elements(&self) -> u64 {
        element_count(&self.shape).unwrap_or(u64::MAX)
    }

    /// Whether the element bytes are in memory
    pub fn is_materialized(&self) -> bool {
        match &self.data {
            ArrayData::Owned(_) => true,
            ArrayData::Located { state, index, .. } => state.is_block_materialized(*index),
        }
    }

    /// Raw little-endian element bytes, materializing the block if needed
    pub fn raw_bytes(&self) -> Result<Bytes> {
        match &self.data {
            ArrayData::Owned(bytes) => Ok(bytes.clone()),
            ArrayData::Located { state, index, order } => {
                let bytes = state.block_data(*index)?;
                let expected = expected_bytes(self.dtype, &self.shape)?;
                if bytes.len() != expected {
                    return Err(FormatError::DataSizeMismatch {
                        expected: expected as u64,
                        actual: bytes.len() as u64,
                    }
                    .into());
                }
                Ok(to_little_endian(self.dtype, *order, bytes))
            }
        }
    }

    /// Elements as a flat row-major vector
    pub fn get_data_vector<T: Element>(&self) -> Result<Vec<T>> {
        if T::DTYPE != self.dtype {
            return Err(Error::TypeMismatch {
                expected: T::DTYPE,
                actual: self.dtype,
            });
        }
        Ok(decode_elements(&self.raw_bytes()?))
    }

    /// Copy with materialized data and the overrides of `options` applied
    pub fn copy_with(&self, options: &CopyOptions) -> Result<Self> {
        Ok(Self {
            dtype: self.dtype,
            shape: self.shape.clone(),
            placement: options.placement.unwrap_or(self.placement),
            codec: options.codec.unwrap_or(self.codec),
            level: options.level.unwrap_or(self.level),
            data: ArrayData::Owned(self.raw_bytes()?),
        })
    }

    /// Descriptor node; block data is appended to `blocks`
    pub(crate) fn to_node(&self, blocks: &mut BlockTable) -> Result<Node> {
        let raw = self.raw_bytes()?;
        let shape = self
            .shape
            .iter()
            .map(|&d| i64::try_from(d).map(Node::Int))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| Error::shape(&self.shape, "dimension exceeds i64::MAX"))?;
        let mut entries = vec![
            ("datatype".to_string(), Node::from(self.dtype.name())),
            ("byteorder".to_string(), Node::from(ByteOrder::Little.name())),
            ("shape".to_string(), Node::List(shape)),
            ("compression".to_string(), Node::from(self.codec.name())),
            ("compression_level".to_string(), Node::Int(i64::from(self.level))),
        ];
        match self.placement {
            Placement::Inline => entries.push((
                "data".to_string(),
                Node::Array(InlineArray::new(self.dtype, self.shape.clone(), raw)),
            )),
            Placement::Block => {
                let index = blocks.push(&raw, self.codec, self.level)?;
                entries.push(("source".to_string(), Node::Int(index as i64)));
            }
        }
        Ok(Node::Map(entries))
    }
}

impl PartialEq for Ndarray {
    fn eq(&self, other: &Self) -> bool {
        let same_descriptor = self.dtype == other.dtype
            && self.shape == other.shape
            && self.placement == other.placement
            && self.codec == other.codec
            && self.level == other.level;
        if !same_descriptor {
            return false;
        }
        match (&self.data, &other.data) {
            (ArrayData::Owned(a), ArrayData::Owned(b)) => a == b,
            (
                ArrayData::Located { state: s1, index: i1, .. },
                ArrayData::Located { state: s2, index: i2, .. },
            ) if Arc::ptr_eq(s1, s2) && i1 == i2 => true,
            // Unreadable data never compares equal.
            _ => match (self.raw_bytes(), other.raw_bytes()) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            },
        }
    }
}

fn malformed(node: &ReaderStateNode, message: &str) -> Error {
    FormatError::malformed(format!("ndarray at /{}: {}", node.path().join("/"), message)).into()
}

enum Layout {
    RowMajor,
    ColumnMajor,
}

/// Classify byte `strides` for `shape`. Strides of dimensions with at most
/// one element never affect addressing and are not compared.
fn layout(shape: &[u64], strides: &[i64], element_size: usize) -> Result<Layout> {
    if strides.is_empty() {
        return Ok(Layout::RowMajor);
    }
    if strides.len() != shape.len() {
        return Err(Error::shape(
            shape,
            format!("{} strides for {} dimensions", strides.len(), shape.len()),
        ));
    }

    if strides_match(shape, strides, element_size, (0..shape.len()).rev()) {
        Ok(Layout::RowMajor)
    } else if strides_match(shape, strides, element_size, 0..shape.len()) {
        Ok(Layout::ColumnMajor)
    } else {
        Err(Error::shape(
            shape,
            format!("strides {:?} are neither row-major nor column-major", strides),
        ))
    }
}

/// Whether `strides` are contiguous when dimensions are visited in `order`,
/// fastest varying first
fn strides_match(
    shape: &[u64],
    strides: &[i64],
    element_size: usize,
    order: impl Iterator<Item = usize>,
) -> bool {
    let mut step = element_size as i64;
    for dim in order {
        if shape[dim] > 1 && strides[dim] != step {
            return false;
        }
        step = step.saturating_mul(shape[dim] as i64);
    }
    true
}

/// Reorder column-major `data` into row-major order
fn column_to_row_major<T: Copy>(data: &[T], shape: &[u64]) -> Vec<T> {
    let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
    let mut col_strides = vec![1usize; dims.len()];
    for k in 1..dims.len() {
        col_strides[k] = col_strides[k - 1] * dims[k - 1];
    }

    let mut out = Vec::with_capacity(data.len());
    let mut index = vec![0usize; dims.len()];
    for _ in 0..data.len() {
        let src: usize = index.iter().zip(&col_strides).map(|(i, s)| i * s).sum();
        out.push(data[src]);
        // Advance the row-major multi-index, last dimension fastest.
        for k in (0..dims.len()).rev() {
            index[k] += 1;
            if index[k] < dims[k] {
                break;
            }
            index[k] = 0;
        }
    }
    out
}

macro_rules! typed_accessors {
    ($($t:ty => $create:ident, $get:ident);* $(;)?) => {
        impl Ndarray {
            $(
                #[doc = concat!("Create an array of `", stringify!($t), "` elements")]
                pub fn $create(
                    data: &[$t],
                    placement: Placement,
                    codec: Codec,
                    level: u32,
                    strides: &[i64],
                    shape: &[u64],
                ) -> Result<Self> {
                    Self::from_elements(data, placement, codec, level, strides, shape)
                }

                #[doc = concat!("Elements as `", stringify!($t), "`")]
                pub fn $get(&self) -> Result<Vec<$t>> {
                    self.get_data_vector::<$t>()
                }
            )*
        }
    };
}

typed_accessors! {
    bool => create_bool8, get_data_vector_bool8;
    i8 => create_int8, get_data_vector_int8;
    i16 => create_int16, get_data_vector_int16;
    i32 => create_int32, get_data_vector_int32;
    i64 => create_int64, get_data_vector_int64;
    u8 => create_uint8, get_data_vector_uint8;
    u16 => create_uint16, get_data_vector_uint16;
    u32 => create_uint32, get_data_vector_uint32;
    u64 => create_uint64, get_data_vector_uint64;
    f32 => create_float32, get_data_vector_float32;
    f64 => create_float64, get_data_vector_float64;
    Complex32 => create_complex64, get_data_vector_complex64;
    Complex64 => create_complex128, get_data_vector_complex128;
}
