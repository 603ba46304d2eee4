use test_case::test_case;

use crate::DType;

#[test_case(DType::Float32, "float")]
#[test_case(DType::Float64, "double")]
#[test_case(DType::bool_(), "bool")]
#[test_case(DType::int(32), "int")]
#[test_case(DType::int(64), "long int")]
#[test_case(DType::int(7), "ap_int<7>")]
#[test_case(DType::uint(32), "unsigned int")]
#[test_case(DType::uint(64), "unsigned long int")]
#[test_case(DType::uint(12), "ap_uint<12>")]
#[test_case(DType::fixed(16, 8), "ap_fixed<16, 8>")]
#[test_case(DType::ufixed(10, 3), "ap_ufixed<10, 3>")]
fn hls_names(dtype: DType, expected: &str) {
    assert_eq!(dtype.hls_type().as_deref(), Some(expected));
}

#[test]
fn no_hls_name() {
    assert_eq!(DType::Float16.hls_type(), None);
    assert_eq!(DType::Index.hls_type(), None);
}
