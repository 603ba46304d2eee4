//! Runtime values of the reference interpreter.
//!
//! Integers, `index` and fixed point values are all stored as an `i128`
//! normalized to their dtype: sign-extended for signed types, zero-extended for
//! unsigned ones and for `i1`. A fixed point value is its raw scaled integer.

use kiln_dtype::{Category, DType};

use crate::types::Shape;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int(i128),
    Float(f64),
}

/// Wrap `value` into the range of `dtype`.
pub fn normalize(value: i128, dtype: DType) -> i128 {
    let width = dtype.width();
    if dtype.is_unsigned() || dtype.is_bool() { unsigned(value, width) } else { signed(value, width) }
}

/// Low `width` bits, sign-extended.
pub fn signed(value: i128, width: u32) -> i128 {
    let shift = 128 - width;
    (value << shift) >> shift
}

/// Low `width` bits, zero-extended.
pub fn unsigned(value: i128, width: u32) -> i128 {
    value & ((1i128 << width) - 1)
}

/// Round a float to the precision of `dtype`.
///
/// Float16 has no host type and keeps double precision.
pub fn round_float(value: f64, dtype: DType) -> f64 {
    match dtype {
        DType::Float32 => value as f32 as f64,
        _ => value,
    }
}

fn scale(frac: u32) -> f64 {
    2f64.powi(frac as i32)
}

/// Convert a scalar of type `from` to type `to`.
pub fn convert(value: Scalar, from: DType, to: DType) -> Scalar {
    let to_frac = to.frac().unwrap_or(0);
    let from_frac = from.frac().unwrap_or(0);

    match (value, from.category(), to.category()) {
        (Scalar::Int(v), Category::Int, Category::Int) => Scalar::Int(normalize(v, to)),
        (Scalar::Int(v), Category::Int, Category::Fixed) => Scalar::Int(normalize(v << to_frac, to)),
        (Scalar::Int(v), Category::Fixed, Category::Int) => Scalar::Int(normalize(v >> from_frac, to)),
        (Scalar::Int(v), Category::Fixed, Category::Fixed) => {
            let shifted = if to_frac >= from_frac { v << (to_frac - from_frac) } else { v >> (from_frac - to_frac) };
            Scalar::Int(normalize(shifted, to))
        }
        (Scalar::Int(v), Category::Float, _) => convert(Scalar::Float(v as f64), from, to),
        (Scalar::Int(v), _, Category::Float) => Scalar::Float(round_float(v as f64 / scale(from_frac), to)),
        (Scalar::Float(x), _, Category::Float) => Scalar::Float(round_float(x, to)),
        (Scalar::Float(x), _, Category::Int) => Scalar::Int(normalize(x.trunc() as i128, to)),
        (Scalar::Float(x), _, Category::Fixed) => Scalar::Int(normalize((x * scale(to_frac)).trunc() as i128, to)),
    }
}

impl Scalar {
    pub fn as_int(self) -> Option<i128> {
        match self {
            Self::Int(v) => Some(v),
            Self::Float(_) => None,
        }
    }

    pub fn as_float(self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(x),
            Self::Int(_) => None,
        }
    }

    /// Numeric value of a scalar of type `dtype`, fixed point scaled back.
    pub fn to_f64(self, dtype: DType) -> f64 {
        match convert(self, dtype, DType::Float64) {
            Self::Float(x) => x,
            Self::Int(v) => v as f64,
        }
    }

    /// Zero of `dtype`.
    pub fn zero(dtype: DType) -> Self {
        if dtype.is_float() { Self::Float(0.0) } else { Self::Int(0) }
    }
}

/// Dense row-major buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer {
    pub shape: Shape,
    pub element: DType,
    data: Vec<Scalar>,
}

impl Buffer {
    pub fn zeros(shape: impl IntoIterator<Item = usize>, element: DType) -> Self {
        let shape: Shape = shape.into_iter().collect();
        let len = shape.iter().product();
        Self { shape, element, data: vec![Scalar::zero(element); len] }
    }

    /// Buffer holding integer values converted to `element`; missing values are zero.
    pub fn from_ints(
        shape: impl IntoIterator<Item = usize>,
        element: DType,
        values: impl IntoIterator<Item = i64>,
    ) -> Self {
        let mut buffer = Self::zeros(shape, element);
        for (slot, v) in buffer.data.iter_mut().zip(values) {
            *slot = convert(Scalar::Int(v as i128), DType::int64(), element);
        }
        buffer
    }

    /// Buffer holding real values converted to `element`; missing values are zero.
    pub fn from_floats(
        shape: impl IntoIterator<Item = usize>,
        element: DType,
        values: impl IntoIterator<Item = f64>,
    ) -> Self {
        let mut buffer = Self::zeros(shape, element);
        for (slot, x) in buffer.data.iter_mut().zip(values) {
            *slot = convert(Scalar::Float(x), DType::Float64, element);
        }
        buffer
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn offset(&self, indices: &[i64]) -> Option<usize> {
        if indices.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0usize;
        for (&index, &dim) in indices.iter().zip(&self.shape) {
            let index = usize::try_from(index).ok().filter(|&i| i < dim)?;
            offset = offset * dim + index;
        }
        Some(offset)
    }

    pub fn get(&self, indices: &[i64]) -> Option<Scalar> {
        self.offset(indices).map(|offset| self.data[offset])
    }

    pub fn set(&mut self, indices: &[i64], value: Scalar) -> bool {
        match self.offset(indices) {
            Some(offset) => {
                self.data[offset] = value;
                true
            }
            None => false,
        }
    }

    /// Element values, fixed point scaled back.
    pub fn to_f64(&self) -> Vec<f64> {
        self.data.iter().map(|s| s.to_f64(self.element)).collect()
    }

    /// Element values converted to `int64`.
    pub fn to_i64(&self) -> Vec<i64> {
        self.data
            .iter()
            .map(|&s| match convert(s, self.element, DType::int64()) {
                Scalar::Int(v) => v as i64,
                Scalar::Float(x) => x as i64,
            })
            .collect()
    }
}
