use kiln_dtype::DType;
use proptest::prelude::*;

use crate::promote::binary_dtypes;

proptest! {
    #[test]
    fn distinct_int_widths_promote_to_wider(lhs in DType::int_generator(), rhs in DType::int_generator()) {
        prop_assume!(lhs.width() != rhs.width());
        let (a, b) = binary_dtypes(lhs, rhs).unwrap();
        let wider = if lhs.width() > rhs.width() { lhs } else { rhs };
        prop_assert_eq!(a, wider);
        prop_assert_eq!(b, wider);
    }

    #[test]
    fn equal_rank_is_left_alone(width in 1u32..=64, signed in any::<bool>()) {
        let (lhs, rhs) = if signed { (DType::int(width), DType::uint(width)) } else { (DType::uint(width), DType::int(width)) };
        prop_assert_eq!(binary_dtypes(lhs, rhs).unwrap(), (lhs, rhs));
    }

    #[test]
    fn fixed_with_shared_fraction_widens(w1 in 8u32..=64, w2 in 8u32..=64, frac in 0u32..=8, s1 in any::<bool>(), s2 in any::<bool>()) {
        let make = |width, signed| if signed { DType::fixed(width, frac) } else { DType::ufixed(width, frac) };
        let (lhs, rhs) = (make(w1, s1), make(w2, s2));
        let (a, b) = binary_dtypes(lhs, rhs).unwrap();

        prop_assert_eq!(a.width(), w1.max(w2));
        prop_assert_eq!(b.width(), w1.max(w2));
        prop_assert_eq!(a.frac(), Some(frac));
        prop_assert_eq!(b.frac(), Some(frac));
        prop_assert_eq!(a.is_unsigned(), !s1);
        prop_assert_eq!(b.is_unsigned(), !s2);
    }

    #[test]
    fn float64_dominates(other in DType::scalar_generator()) {
        prop_assert_eq!(binary_dtypes(DType::Float64, other).unwrap(), (DType::Float64, DType::Float64));
        prop_assert_eq!(binary_dtypes(other, DType::Float64).unwrap(), (DType::Float64, DType::Float64));
    }

    #[test]
    fn promotion_is_symmetric(lhs in DType::scalar_generator(), rhs in DType::scalar_generator()) {
        let forward = binary_dtypes(lhs, rhs).ok().map(|(a, b)| (b, a));
        prop_assert_eq!(forward, binary_dtypes(rhs, lhs).ok());
    }
}
