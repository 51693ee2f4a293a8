//! Randomized roundtrips

use asdf::{Codec, Document, Entry, Group, Ndarray, Placement, Reference, Scalar};
use proptest::prelude::*;

fn storage() -> impl Strategy<Value = (Placement, Codec, u32)> {
    prop_oneof![
        Just((Placement::Inline, Codec::None, 0)),
        Just((Placement::Block, Codec::None, 0)),
        (0u32..=9).prop_map(|level| (Placement::Block, Codec::Zlib, level)),
        (1u32..=9).prop_map(|level| (Placement::Block, Codec::Bzip2, level)),
    ]
}

fn shape() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..5, 0..4)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any int32 array survives a write/read cycle unchanged.
    #[test]
    fn prop_int32_roundtrip(shape in shape(), (placement, codec, level) in storage(), seed in any::<i32>()) {
        let count: u64 = shape.iter().product();
        let data: Vec<i32> = (0..count as i32).map(|i| i.wrapping_mul(seed)).collect();
        let arr = Ndarray::create_int32(&data, placement, codec, level, &[], &shape).unwrap();
        let group = Group::create([("x", Entry::create_from_ndarray("x", arr, ""))]).unwrap();
        let doc = Document::create_from_group(Vec::<(String, Scalar)>::new(), group);

        let back = Document::from_bytes(doc.to_bytes().unwrap()).unwrap();
        let arr = back.get_group().get("x").unwrap().get_ndarray().unwrap();
        prop_assert_eq!(arr.shape(), shape.as_slice());
        prop_assert_eq!(arr.get_data_vector_int32().unwrap(), data);
    }

    /// Raw bytes of float64 arrays, NaN payloads included, are preserved.
    #[test]
    fn prop_float64_bits_preserved(bits in prop::collection::vec(any::<u64>(), 0..64), (placement, codec, level) in storage()) {
        let data: Vec<f64> = bits.iter().map(|&b| f64::from_bits(b)).collect();
        let arr = Ndarray::create_float64(&data, placement, codec, level, &[], &[data.len() as u64]).unwrap();
        let group = Group::create([("f", Entry::create_from_ndarray("f", arr, ""))]).unwrap();
        let doc = Document::create_from_group(Vec::<(String, Scalar)>::new(), group);

        let back = Document::from_bytes(doc.to_bytes().unwrap()).unwrap();
        let values = back.get_group().get("f").unwrap().get_ndarray().unwrap().get_data_vector_float64().unwrap();
        let back_bits: Vec<u64> = values.iter().map(|v| v.to_bits()).collect();
        prop_assert_eq!(back_bits, bits);
    }

    /// Reference targets decode to the segments they were built from.
    #[test]
    fn prop_reference_segments(segments in prop::collection::vec(".*", 0..5), external in "([a-z#% ]{0,6}/)?[a-z#%]{0,8}(\\.asdf)?") {
        let reference = Reference::create_from_path(&external, &segments);
        let (path, decoded) = reference.split_target().unwrap();
        prop_assert_eq!(path, external);
        prop_assert_eq!(decoded, segments);
    }
}
