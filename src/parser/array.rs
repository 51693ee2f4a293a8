//! Inline array parsing

use super::cursor::ByteCursor;
use crate::error::FormatError;
use crate::types::{ElementType, InlineArray};

/// Parse an inline array (after tag has been consumed)
pub fn parse_array_body(cursor: &mut ByteCursor) -> Result<InlineArray, FormatError> {
    // Parse dtype
    let position = cursor.position();
    let tag = cursor.u8()?;
    let dtype = ElementType::from_u8(tag).ok_or(FormatError::InvalidDType { tag, position })?;

    // Parse ndim and shape
    let ndim = cursor.u8()? as usize;
    let shape = cursor.ntimes(ndim, 8, ByteCursor::u64_le)?;

    // Parse data size, then take data bytes (zero-copy)
    let data_size = cursor.u64_le()?;
    let len = usize::try_from(data_size).map_err(|_| FormatError::UnexpectedEof {
        position: cursor.position(),
    })?;
    let data = cursor.take(len)?;

    let array = InlineArray { dtype, shape, data };
    let Some(expected) = array.expected_size() else {
        return Err(FormatError::malformed(format!(
            "inline array shape {:?} overflows the element count",
            array.shape
        )));
    };
    if expected != data_size {
        return Err(FormatError::DataSizeMismatch {
            expected,
            actual: data_size,
        });
    }
    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn make_array_bytes(dtype: ElementType, shape: &[u64], data: &[u8]) -> Bytes {
        let mut bytes = Vec::new();
        bytes.push(dtype as u8);
        bytes.push(shape.len() as u8);
        for dim in shape {
            bytes.extend_from_slice(&dim.to_le_bytes());
        }
        bytes.extend_from_slice(&(data.len() as u64).to_le_bytes());
        bytes.extend_from_slice(data);
        Bytes::from(bytes)
    }

    #[test]
    fn test_parse_array_2d() {
        let bytes = make_array_bytes(ElementType::F32, &[2, 3], &[0u8; 24]);
        let arr = parse_array_body(&mut ByteCursor::new(bytes)).unwrap();
        assert_eq!(arr.dtype, ElementType::F32);
        assert_eq!(arr.shape, vec![2, 3]);
        assert_eq!(arr.data.len(), 24);
    }

    #[test]
    fn test_parse_scalar() {
        let bytes = make_array_bytes(ElementType::I64, &[], &42i64.to_le_bytes());
        let arr = parse_array_body(&mut ByteCursor::new(bytes)).unwrap();
        assert!(arr.shape.is_empty());
        assert_eq!(arr.num_elements(), Some(1));
    }

    #[test]
    fn test_parse_array_zero_copy() {
        let bytes = make_array_bytes(ElementType::U8, &[4], &[1, 2, 3, 4]);
        let arr = parse_array_body(&mut ByteCursor::new(bytes.clone())).unwrap();

        let data_offset = 1 + 1 + 8 + 8; // dtype + ndim + shape + data_len
        assert!(std::ptr::eq(arr.data.as_ptr(), bytes[data_offset..].as_ptr()));
    }

    #[test]
    fn test_invalid_dtype() {
        let mut bytes = vec![0xFF, 1];
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.extend_from_slice(&0u64.to_le_bytes());
        let result = parse_array_body(&mut ByteCursor::new(Bytes::from(bytes)));
        assert_eq!(
            result,
            Err(FormatError::InvalidDType {
                tag: 0xFF,
                position: 0
            })
        );
    }

    #[test]
    fn test_size_disagreeing_with_shape() {
        let bytes = make_array_bytes(ElementType::I32, &[3], &[0u8; 8]);
        let result = parse_array_body(&mut ByteCursor::new(bytes));
        assert_eq!(
            result,
            Err(FormatError::DataSizeMismatch {
                expected: 12,
                actual: 8
            })
        );
    }

    #[test]
    fn test_overflowing_shape_is_malformed() {
        let bytes = make_array_bytes(ElementType::U8, &[1 << 33, 1 << 33], &[]);
        let result = parse_array_body(&mut ByteCursor::new(bytes));
        assert!(matches!(result, Err(FormatError::Malformed { .. })));
    }
}
