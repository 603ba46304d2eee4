use test_case::test_case;

use crate::{DType, Error};

#[test_case("index", DType::Index; "index")]
#[test_case("int1", DType::bool_(); "bool")]
#[test_case("int32", DType::int(32); "int32")]
#[test_case("int64", DType::int(64); "int64")]
#[test_case("uint8", DType::uint(8); "uint8")]
#[test_case("uint17", DType::uint(17); "odd unsigned width")]
#[test_case("float16", DType::Float16; "half")]
#[test_case("float32", DType::Float32; "single")]
#[test_case("float64", DType::Float64; "double")]
#[test_case("fixed16_8", DType::fixed(16, 8); "fixed")]
#[test_case("ufixed8_4", DType::ufixed(8, 4); "ufixed")]
#[test_case("fixed12_0", DType::fixed(12, 0); "integral fixed")]
fn parse_valid(text: &str, expected: DType) {
    assert_eq!(DType::parse(text).unwrap(), expected);
    assert_eq!(expected.to_string(), text);
}

#[test_case("int"; "missing width")]
#[test_case("int0"; "zero width")]
#[test_case("int-4"; "negative width")]
#[test_case("float8"; "unsupported float width")]
#[test_case("float"; "bare float")]
#[test_case("fixed16"; "missing fraction")]
#[test_case("fixed8_9"; "fraction wider than type")]
#[test_case("ufixed_4"; "missing fixed width")]
#[test_case("double"; "foreign name")]
#[test_case(""; "empty")]
#[test_case(" int32"; "leading whitespace")]
fn parse_unrecognized(text: &str) {
    assert!(matches!(DType::parse(text), Err(Error::UnrecognizedType { .. })), "{text:?}");
}

#[test]
fn parse_too_wide() {
    assert_eq!(DType::parse("int65"), Err(Error::UnsupportedWidth { width: 65 }));
    assert_eq!(DType::parse("uint128"), Err(Error::UnsupportedWidth { width: 128 }));
    assert_eq!(DType::parse("fixed65_4"), Err(Error::UnsupportedWidth { width: 65 }));
    assert_eq!(DType::parse("ufixed1000_4"), Err(Error::UnsupportedWidth { width: 1000 }));
    assert_eq!(DType::parse("fixed64_4"), Ok(DType::fixed(64, 4)));
}

#[test]
fn from_str_matches_parse() {
    let dtype: DType = "ufixed12_6".parse().unwrap();
    assert_eq!(dtype, DType::ufixed(12, 6));
    assert!(dtype.is_fixed() && dtype.is_unsigned());
    assert_eq!(dtype.frac(), Some(6));
}
