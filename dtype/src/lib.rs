//! Semantic data types for the kiln expression builder.
//!
//! A [`DType`] is one of the numeric types a hardware kernel can carry:
//! signed/unsigned integers of any width up to 64 bits, the `index` type used
//! for addressing, signed/unsigned fixed point, and IEEE floats.
//!
//! - [`parse`] - textual grammar (`int32`, `ufixed8_4`, ...) and its inverse
//! - [`rank`] - promotion ranking used by the cast engine

pub mod error;
pub mod parse;
pub mod rank;

#[cfg(any(test, feature = "proptest"))]
pub mod test;

pub use error::{Error, Result};

/// Largest integer or fixed point width the builder accepts.
pub const MAX_INT_WIDTH: u32 = 64;

/// Scalar data type.
///
/// Immutable value type, compared structurally: `Fixed { 16, 8 }` equals any
/// other `Fixed { 16, 8 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// Signed (or signless) integer.
    Int { width: u32 },
    /// Unsigned integer.
    UInt { width: u32 },
    /// Target-sized addressing integer.
    Index,
    /// Signed fixed point with `frac` fractional bits out of `width`.
    Fixed { width: u32, frac: u32 },
    /// Unsigned fixed point.
    UFixed { width: u32, frac: u32 },
    Float16,
    Float32,
    Float64,
}

/// Operand category, used to pick per-category operations in the target IR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    /// Integers and `index`.
    Int,
    Float,
    Fixed,
}

impl DType {
    // =========================================================================
    // Constructors
    // =========================================================================

    pub const fn int(width: u32) -> Self {
        Self::Int { width }
    }

    pub const fn uint(width: u32) -> Self {
        Self::UInt { width }
    }

    pub const fn fixed(width: u32, frac: u32) -> Self {
        Self::Fixed { width, frac }
    }

    pub const fn ufixed(width: u32, frac: u32) -> Self {
        Self::UFixed { width, frac }
    }

    /// The 1-bit integer produced by comparisons and bit extraction.
    pub const fn bool_() -> Self {
        Self::Int { width: 1 }
    }

    pub const fn int32() -> Self {
        Self::Int { width: 32 }
    }

    pub const fn int64() -> Self {
        Self::Int { width: 64 }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Integer of any signedness (not `index`).
    pub const fn is_int(&self) -> bool {
        matches!(self, Self::Int { .. } | Self::UInt { .. })
    }

    pub const fn is_index(&self) -> bool {
        matches!(self, Self::Index)
    }

    /// Integer or `index`.
    pub const fn is_integer_like(&self) -> bool {
        self.is_int() || self.is_index()
    }

    pub const fn is_fixed(&self) -> bool {
        matches!(self, Self::Fixed { .. } | Self::UFixed { .. })
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float16 | Self::Float32 | Self::Float64)
    }

    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Int { width: 1 })
    }

    /// Unsigned integers and unsigned fixed point.
    pub const fn is_unsigned(&self) -> bool {
        matches!(self, Self::UInt { .. } | Self::UFixed { .. })
    }

    /// Everything that is not unsigned; signless integers and `index` count as signed.
    pub const fn is_signed(&self) -> bool {
        !self.is_unsigned()
    }

    pub const fn category(&self) -> Category {
        match self {
            Self::Int { .. } | Self::UInt { .. } | Self::Index => Category::Int,
            Self::Fixed { .. } | Self::UFixed { .. } => Category::Fixed,
            Self::Float16 | Self::Float32 | Self::Float64 => Category::Float,
        }
    }

    /// Bit width. `index` is treated as 64 bits wide.
    pub const fn width(&self) -> u32 {
        match self {
            Self::Int { width } | Self::UInt { width } => *width,
            Self::Fixed { width, .. } | Self::UFixed { width, .. } => *width,
            Self::Index => 64,
            Self::Float16 => 16,
            Self::Float32 => 32,
            Self::Float64 => 64,
        }
    }

    /// Fraction width of fixed point types, `None` otherwise.
    pub const fn frac(&self) -> Option<u32> {
        match self {
            Self::Fixed { frac, .. } | Self::UFixed { frac, .. } => Some(*frac),
            _ => None,
        }
    }

    /// Same kind and fraction, different total width.
    pub const fn with_width(&self, width: u32) -> Self {
        match *self {
            Self::Int { .. } => Self::Int { width },
            Self::UInt { .. } => Self::UInt { width },
            Self::Fixed { frac, .. } => Self::Fixed { width, frac },
            Self::UFixed { frac, .. } => Self::UFixed { width, frac },
            other => other,
        }
    }

    /// Largest raw value representable in `width` bits, as the integer that
    /// backs integer and fixed point values.
    ///
    /// `int1` holds `0` and `1`. Returns `None` for floats and for widths
    /// above [`MAX_INT_WIDTH`].
    pub fn raw_max(&self) -> Option<i128> {
        if self.width() > MAX_INT_WIDTH {
            return None;
        }
        match self {
            Self::Int { width: 1 } => Some(1),
            Self::Int { width } | Self::Fixed { width, .. } => Some((1i128 << (width - 1)) - 1),
            Self::UInt { width } | Self::UFixed { width, .. } => Some((1i128 << width) - 1),
            Self::Index => Some(i64::MAX as i128),
            _ => None,
        }
    }

    /// Smallest raw value representable in `width` bits.
    pub fn raw_min(&self) -> Option<i128> {
        if self.width() > MAX_INT_WIDTH {
            return None;
        }
        match self {
            Self::Int { width: 1 } => Some(0),
            Self::Int { width } | Self::Fixed { width, .. } => Some(-(1i128 << (width - 1))),
            Self::UInt { .. } | Self::UFixed { .. } => Some(0),
            Self::Index => Some(i64::MIN as i128),
            _ => None,
        }
    }

    /// C/HLS spelling of the type, as used by HLS code emitters.
    ///
    /// Float16 and `index` have no HLS spelling.
    pub fn hls_type(&self) -> Option<String> {
        Some(match *self {
            Self::Float32 => "float".to_string(),
            Self::Float64 => "double".to_string(),
            Self::Int { width: 1 } => "bool".to_string(),
            Self::Int { width: 32 } => "int".to_string(),
            Self::Int { width: 64 } => "long int".to_string(),
            Self::Int { width } => format!("ap_int<{width}>"),
            Self::UInt { width: 32 } => "unsigned int".to_string(),
            Self::UInt { width: 64 } => "unsigned long int".to_string(),
            Self::UInt { width } => format!("ap_uint<{width}>"),
            Self::Fixed { width, frac } => format!("ap_fixed<{width}, {frac}>"),
            Self::UFixed { width, frac } => format!("ap_ufixed<{width}, {frac}>"),
            Self::Float16 | Self::Index => return None,
        })
    }
}
