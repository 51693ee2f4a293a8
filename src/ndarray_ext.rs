//! ndarray integration
//!
//! Conversions between [`Ndarray`] and `ndarray::ArrayD`.
//!
//! Enable with the `ndarray` feature flag.

use crate::codec::Codec;
use crate::error::{Error, Result};
use crate::ndarray::{Element, Ndarray, Placement};
use ::ndarray::{ArrayD, ArrayViewD, IxDyn};

impl Ndarray {
    /// Create an array from any ndarray view.
    ///
    /// Elements are taken in logical row-major order, so views with
    /// arbitrary memory layout (transposed, sliced) are accepted.
    pub fn from_ndarray<T: Element>(
        array: ArrayViewD<'_, T>,
        placement: Placement,
        codec: Codec,
        level: u32,
    ) -> Result<Self> {
        let shape: Vec<u64> = array.shape().iter().map(|&d| d as u64).collect();
        let data: Vec<T> = array.iter().copied().collect();
        Self::from_elements(&data, placement, codec, level, &[], &shape)
    }

    /// Convert to an owned ndarray `ArrayD`, materializing block data
    pub fn to_ndarray<T: Element>(&self) -> Result<ArrayD<T>> {
        let data = self.get_data_vector::<T>()?;
        let shape = self
            .shape()
            .iter()
            .map(|&d| usize::try_from(d))
            .collect::<std::result::Result<Vec<usize>, _>>()
            .map_err(|_| Error::shape(self.shape(), "dimension exceeds usize"))?;
        ArrayD::from_shape_vec(IxDyn(&shape), data)
            .map_err(|e| Error::shape(self.shape(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ElementType;
    use ::ndarray::array;

    fn inline<T: Element>(arr: &ArrayD<T>) -> Ndarray {
        Ndarray::from_ndarray(arr.view(), Placement::Inline, Codec::None, 0).unwrap()
    }

    #[test]
    fn roundtrip_1d_f32() {
        let arr = array![1.0f32, 2.0, 3.0, 4.0].into_dyn();
        let nd = inline(&arr);

        assert_eq!(nd.element_type(), ElementType::F32);
        assert_eq!(nd.shape(), [4]);

        let back: ArrayD<f32> = nd.to_ndarray().unwrap();
        assert_eq!(arr, back);
    }

    #[test]
    fn roundtrip_2d_i32() {
        let arr = array![[1i32, 2, 3], [4, 5, 6]].into_dyn();
        let nd = inline(&arr);
        assert_eq!(nd.shape(), [2, 3]);
        assert_eq!(nd.to_ndarray::<i32>().unwrap(), arr);
    }

    #[test]
    fn transposed_view_is_reordered() {
        let arr = array![[1u8, 2, 3], [4, 5, 6]].into_dyn();
        let nd = Ndarray::from_ndarray(arr.t(), Placement::Inline, Codec::None, 0).unwrap();
        assert_eq!(nd.shape(), [3, 2]);
        assert_eq!(nd.get_data_vector_uint8().unwrap(), vec![1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn dtype_mismatch_error() {
        let nd = inline(&array![1.0f32, 2.0, 3.0].into_dyn());
        let result: Result<ArrayD<f64>> = nd.to_ndarray();
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn scalar_is_zero_dimensional() {
        let nd = Ndarray::create_int16(&[7], Placement::Inline, Codec::None, 0, &[], &[]).unwrap();
        let arr = nd.to_ndarray::<i16>().unwrap();
        assert_eq!(arr.ndim(), 0);
        assert_eq!(arr.iter().copied().collect::<Vec<_>>(), vec![7]);
    }
}
