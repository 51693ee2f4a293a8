//! Element types that can be stored in an ndarray

use crate::types::ElementType;
use bytes::Bytes;
use num_complex::{Complex32, Complex64};

/// A Rust type with a fixed little-endian encoding as an [`ElementType`]
pub trait Element: Copy + Send + Sync + 'static {
    const DTYPE: ElementType;

    /// Decode one element; `bytes` holds exactly `DTYPE.element_size()` bytes
    fn read_le(bytes: &[u8]) -> Self;

    fn write_le(&self, out: &mut Vec<u8>);
}

macro_rules! impl_element_primitive {
    ($($t:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for $t {
                const DTYPE: ElementType = ElementType::$dtype;

                fn read_le(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(bytes);
                    <$t>::from_le_bytes(buf)
                }

                fn write_le(&self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_element_primitive! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

// Any nonzero byte reads as true.
impl Element for bool {
    const DTYPE: ElementType = ElementType::Bool8;

    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    fn write_le(&self, out: &mut Vec<u8>) {
        out.push(u8::from(*self));
    }
}

// Complex values are stored as interleaved (re, im) pairs.
impl Element for Complex32 {
    const DTYPE: ElementType = ElementType::Complex64;

    fn read_le(bytes: &[u8]) -> Self {
        Complex32::new(f32::read_le(&bytes[..4]), f32::read_le(&bytes[4..]))
    }

    fn write_le(&self, out: &mut Vec<u8>) {
        self.re.write_le(out);
        self.im.write_le(out);
    }
}

impl Element for Complex64 {
    const DTYPE: ElementType = ElementType::Complex128;

    fn read_le(bytes: &[u8]) -> Self {
        Complex64::new(f64::read_le(&bytes[..8]), f64::read_le(&bytes[8..]))
    }

    fn write_le(&self, out: &mut Vec<u8>) {
        self.re.write_le(out);
        self.im.write_le(out);
    }
}

/// Byte order of element data in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

impl ByteOrder {
    pub fn name(self) -> &'static str {
        match self {
            ByteOrder::Little => "little",
            ByteOrder::Big => "big",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "little" => Some(ByteOrder::Little),
            "big" => Some(ByteOrder::Big),
            _ => None,
        }
    }
}

/// Element bytes of `dtype` stored in `order`, converted to little-endian.
/// Complex values are swapped per component.
pub fn to_little_endian(dtype: ElementType, order: ByteOrder, bytes: Bytes) -> Bytes {
    let width = dtype.component_size();
    if order == ByteOrder::Little || width == 1 {
        return bytes;
    }
    let mut out = bytes.to_vec();
    for component in out.chunks_exact_mut(width) {
        component.reverse();
    }
    Bytes::from(out)
}

/// Encode a slice of elements as little-endian bytes
pub fn encode_elements<T: Element>(data: &[T]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * T::DTYPE.element_size());
    for value in data {
        value.write_le(&mut out);
    }
    out
}

/// Decode little-endian bytes; trailing bytes that do not form a whole
/// element are ignored
pub fn decode_elements<T: Element>(bytes: &[u8]) -> Vec<T> {
    bytes
        .chunks_exact(T::DTYPE.element_size())
        .map(T::read_le)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_dtype() {
        fn check<T: Element>() {
            assert_eq!(std::mem::size_of::<T>(), T::DTYPE.element_size(), "{}", T::DTYPE);
        }
        check::<i8>();
        check::<u16>();
        check::<i32>();
        check::<u64>();
        check::<f32>();
        check::<f64>();
        check::<bool>();
        check::<Complex32>();
        check::<Complex64>();
    }

    #[test]
    fn little_endian_layout() {
        assert_eq!(encode_elements(&[0x0102u16]), vec![0x02, 0x01]);
        assert_eq!(encode_elements(&[-1i32]), vec![0xFF; 4]);
    }

    #[test]
    fn complex_interleaved() {
        let bytes = encode_elements(&[Complex32::new(1.0, -2.0)]);
        assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[4..], &(-2.0f32).to_le_bytes());
        assert_eq!(decode_elements::<Complex32>(&bytes), vec![Complex32::new(1.0, -2.0)]);
    }

    #[test]
    fn bool_nonzero_is_true() {
        assert_eq!(decode_elements::<bool>(&[0, 1, 7]), vec![false, true, true]);
        assert_eq!(encode_elements(&[true, false]), vec![1, 0]);
    }

    #[test]
    fn big_endian_is_swapped_per_component() {
        let mut big = Vec::new();
        big.extend_from_slice(&1.5f32.to_be_bytes());
        big.extend_from_slice(&(-2.0f32).to_be_bytes());
        let little = to_little_endian(ElementType::Complex64, ByteOrder::Big, Bytes::from(big));
        assert_eq!(decode_elements::<Complex32>(&little), vec![Complex32::new(1.5, -2.0)]);

        let bytes = Bytes::from_static(&[1, 0, 7]);
        assert_eq!(to_little_endian(ElementType::U8, ByteOrder::Big, bytes.clone()), bytes);
        assert_eq!(to_little_endian(ElementType::I16, ByteOrder::Little, bytes.clone()), bytes);
    }
}
