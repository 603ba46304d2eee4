//! Value types and attributes of the target IR.

use std::fmt;

use kiln_dtype::DType;
use smallvec::SmallVec;

use crate::affine::{AffineMap, IntegerSet};

pub type Shape = SmallVec<[usize; 4]>;

/// Type of an SSA value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Scalar(DType),
    /// Statically shaped buffer.
    MemRef { shape: Shape, element: DType },
}

impl Type {
    pub fn memref(shape: impl IntoIterator<Item = usize>, element: DType) -> Self {
        Self::MemRef { shape: shape.into_iter().collect(), element }
    }

    /// Scalar dtype, or the element dtype of a buffer.
    pub fn dtype(&self) -> DType {
        match self {
            Self::Scalar(dtype) | Self::MemRef { element: dtype, .. } => *dtype,
        }
    }

    pub fn as_scalar(&self) -> Option<DType> {
        match self {
            Self::Scalar(dtype) => Some(*dtype),
            Self::MemRef { .. } => None,
        }
    }

    pub fn shape(&self) -> Option<&[usize]> {
        match self {
            Self::MemRef { shape, .. } => Some(shape),
            Self::Scalar(_) => None,
        }
    }
}

impl From<DType> for Type {
    fn from(dtype: DType) -> Self {
        Self::Scalar(dtype)
    }
}

/// Spelling of a dtype in IR text.
pub(crate) struct IrDType(pub DType);

impl fmt::Display for IrDType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            DType::Int { width } => write!(f, "i{width}"),
            DType::UInt { width } => write!(f, "ui{width}"),
            DType::Index => f.write_str("index"),
            DType::Fixed { width, frac } => write!(f, "!kiln.fixed<{width}, {frac}>"),
            DType::UFixed { width, frac } => write!(f, "!kiln.ufixed<{width}, {frac}>"),
            DType::Float16 => f.write_str("f16"),
            DType::Float32 => f.write_str("f32"),
            DType::Float64 => f.write_str("f64"),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(dtype) => IrDType(*dtype).fmt(f),
            Self::MemRef { shape, element } => {
                f.write_str("memref<")?;
                for dim in shape {
                    write!(f, "{dim}x")?;
                }
                write!(f, "{}>", IrDType(*element))
            }
        }
    }
}

/// Compile-time operation attribute.
///
/// Fixed point constants carry their raw scaled integer in [`Attribute::Int`].
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Int { value: i64, ty: DType },
    Float { value: f64, ty: DType },
    Str(String),
    AffineMap(AffineMap),
    IntegerSet(IntegerSet),
    /// Reference to a function by name.
    SymbolRef(String),
    /// Presence-only flag.
    Unit,
}

impl Attribute {
    pub fn index(value: i64) -> Self {
        Self::Int { value, ty: DType::Index }
    }

    pub fn i64(value: i64) -> Self {
        Self::Int { value, ty: DType::int64() }
    }

    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) | Self::SymbolRef(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_affine_map(&self) -> Option<&AffineMap> {
        match self {
            Self::AffineMap(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_integer_set(&self) -> Option<&IntegerSet> {
        match self {
            Self::IntegerSet(set) => Some(set),
            _ => None,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int { value, ty } if ty.is_unsigned() && ty.width() == 64 => {
                write!(f, "{} : {}", *value as u64, IrDType(*ty))
            }
            Self::Int { value, ty } => write!(f, "{value} : {}", IrDType(*ty)),
            Self::Float { value, ty } => write!(f, "{value:?} : {}", IrDType(*ty)),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::AffineMap(map) => write!(f, "affine_map<{map}>"),
            Self::IntegerSet(set) => write!(f, "affine_set<{set}>"),
            Self::SymbolRef(name) => write!(f, "@{name}"),
            Self::Unit => f.write_str("unit"),
        }
    }
}
