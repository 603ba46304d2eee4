use proptest::prelude::*;

use crate::AffineExpr;

use super::generators::affine_expr;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn generated_expressions_are_pure(expr in affine_expr(3)) {
        prop_assert!(expr.is_pure_affine());
    }

    #[test]
    fn floor_div_and_mod_recompose(a in -1000i64..1000, b in 1i64..50) {
        let q = AffineExpr::constant(a).floor_div(b).as_constant().unwrap();
        let r = AffineExpr::constant(a).modulo(b).as_constant().unwrap();
        prop_assert_eq!(q * b + r, a);
        prop_assert!((0..b).contains(&r));
        prop_assert_eq!(q, (a as f64 / b as f64).floor() as i64);
    }

    #[test]
    fn ceil_div_rounds_up(a in -1000i64..1000, b in 1i64..50) {
        let q = AffineExpr::constant(a).ceil_div(b).as_constant().unwrap();
        prop_assert_eq!(q, (a as f64 / b as f64).ceil() as i64);
    }

    #[test]
    fn folding_preserves_value(expr in affine_expr(2), d0 in -20i64..20, d1 in -20i64..20) {
        let unfolded = |e: &AffineExpr| e.eval(&[d0, d1], &[]);
        // Adding zero and multiplying by one fold away without changing the value.
        let padded = (expr.clone() + 0) * 1;
        prop_assert_eq!(unfolded(&padded), unfolded(&expr));
        prop_assert_eq!(padded, expr);
    }
}
