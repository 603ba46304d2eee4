use kiln_dtype::DType;
use proptest::prelude::*;

use crate::interp::{Scalar, convert, normalize};

proptest! {
    #[test]
    fn normalize_is_idempotent(value in any::<i64>(), dtype in DType::int_generator()) {
        let once = normalize(value as i128, dtype);
        prop_assert_eq!(normalize(once, dtype), once);
        prop_assert!(dtype.raw_min().unwrap() <= once && once <= dtype.raw_max().unwrap());
    }

    #[test]
    fn widening_int_cast_keeps_value(value in any::<i16>()) {
        let widened = convert(Scalar::Int(value as i128), DType::int(16), DType::int(64));
        prop_assert_eq!(widened, Scalar::Int(value as i128));
    }

    #[test]
    fn fixed_round_trips_through_float(raw in -32768i128..32768) {
        let fixed = DType::fixed(16, 8);
        let float = convert(Scalar::Int(raw), fixed, DType::Float64);
        prop_assert_eq!(convert(float, DType::Float64, fixed), Scalar::Int(raw));
    }
}
