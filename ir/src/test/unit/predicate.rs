use std::str::FromStr;

use kiln_dtype::Category;
use test_case::test_case;

use crate::{CmpFPredicate, CmpIPredicate, OpKind};

#[test_case(CmpIPredicate::Eq, 0)]
#[test_case(CmpIPredicate::Ne, 1)]
#[test_case(CmpIPredicate::Slt, 2)]
#[test_case(CmpIPredicate::Sge, 5)]
#[test_case(CmpIPredicate::Ult, 6)]
#[test_case(CmpIPredicate::Uge, 9)]
fn int_codes(predicate: CmpIPredicate, code: i64) {
    assert_eq!(predicate.code(), code);
    assert_eq!(CmpIPredicate::from_repr(code), Some(predicate));
}

#[test_case(CmpFPredicate::False, 0)]
#[test_case(CmpFPredicate::Oeq, 1)]
#[test_case(CmpFPredicate::Ogt, 2)]
#[test_case(CmpFPredicate::Olt, 4)]
#[test_case(CmpFPredicate::One, 6)]
#[test_case(CmpFPredicate::Une, 13)]
#[test_case(CmpFPredicate::True, 15)]
fn float_codes(predicate: CmpFPredicate, code: i64) {
    assert_eq!(predicate.code(), code);
}

#[test]
fn ordered_predicates_reject_nan() {
    assert!(!CmpFPredicate::Olt.eval(f64::NAN, 1.0));
    assert!(CmpFPredicate::Ult.eval(f64::NAN, 1.0));
    assert!(CmpFPredicate::Oge.eval(2.0, 2.0));
}

#[test]
fn op_names() {
    assert_eq!(OpKind::AffineFor.to_string(), "affine.for");
    assert_eq!(OpKind::FloorDivSI.to_string(), "arith.floordivsi");
    assert_eq!(OpKind::from_str("kiln.get_bit"), Ok(OpKind::GetBit));
    assert_eq!(OpKind::compare_for(Category::Fixed), OpKind::CmpFixed);
}
