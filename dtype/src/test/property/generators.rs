use proptest::prelude::*;

use crate::{DType, MAX_INT_WIDTH};

pub fn int_width() -> impl Strategy<Value = u32> {
    1..=MAX_INT_WIDTH
}

pub fn int_dtype() -> impl Strategy<Value = DType> {
    prop_oneof![int_width().prop_map(DType::int), int_width().prop_map(DType::uint)]
}

/// Fixed point types with `frac <= width`.
pub fn fixed_dtype() -> impl Strategy<Value = DType> {
    (1u32..=64)
        .prop_flat_map(|width| (Just(width), 0..=width, any::<bool>()))
        .prop_map(|(width, frac, signed)| if signed { DType::fixed(width, frac) } else { DType::ufixed(width, frac) })
}

pub fn float_dtype() -> impl Strategy<Value = DType> {
    prop_oneof![Just(DType::Float16), Just(DType::Float32), Just(DType::Float64)]
}

/// Every dtype the textual grammar can spell.
pub fn any_dtype() -> impl Strategy<Value = DType> {
    prop_oneof![int_dtype(), Just(DType::Index), fixed_dtype(), float_dtype()]
}

#[rustfmt::skip]
impl DType {
    pub fn int_generator() -> impl Strategy<Value = Self> { int_dtype() }

    pub fn fixed_generator() -> impl Strategy<Value = Self> { fixed_dtype() }

    pub fn float_generator() -> impl Strategy<Value = Self> { float_dtype() }

    pub fn scalar_generator() -> impl Strategy<Value = Self> { any_dtype() }
}
