use proptest::prelude::*;

use crate::{DType, Error};
use crate::rank::{FIXED_RANK_BASE, FLOAT_RANK_BASE};

use super::generators::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn parse_inverts_display(dtype in any_dtype()) {
        let text = dtype.to_string();
        prop_assert_eq!(DType::parse(&text), Ok(dtype));
    }

    #[test]
    fn floats_rank_above_everything(float in float_dtype(), other in prop_oneof![int_dtype(), fixed_dtype(), Just(DType::Index)]) {
        prop_assert!(float.rank().unwrap() > other.rank().unwrap());
        prop_assert!(float.rank().unwrap() > FLOAT_RANK_BASE);
    }

    #[test]
    fn fixed_ranks_above_integers(fixed in fixed_dtype(), int in int_dtype()) {
        prop_assert!(fixed.rank().unwrap() > int.rank().unwrap());
        prop_assert_eq!(fixed.rank().unwrap(), FIXED_RANK_BASE + fixed.width());
    }

    #[test]
    fn integer_rank_is_width(int in int_dtype()) {
        prop_assert_eq!(int.rank().unwrap(), int.width());
    }

    #[test]
    fn raw_range_contains_zero(dtype in prop_oneof![int_dtype(), fixed_dtype()]) {
        let (min, max) = (dtype.raw_min().unwrap(), dtype.raw_max().unwrap());
        prop_assert!(min <= 0 && 0 <= max);
        prop_assert_eq!(max - min + 1, 1i128 << dtype.width());
    }

    #[test]
    fn wide_fixed_is_rejected(width in 65u32..=1000, frac in 0u32..=64, unsigned in any::<bool>()) {
        let dtype = if unsigned { DType::ufixed(width, frac) } else { DType::fixed(width, frac) };
        prop_assert_eq!(DType::parse(&dtype.to_string()), Err(Error::UnsupportedWidth { width }));
        prop_assert_eq!(dtype.rank(), Err(Error::UnsupportedWidth { width }));
        prop_assert_eq!(dtype.raw_max(), None);
    }
}
