//! Textual dtype grammar.
//!
//! ```text
//! index | int<N> | uint<N> | float16 | float32 | float64 | fixed<W>_<F> | ufixed<W>_<F>
//! ```
//!
//! [`Display`](std::fmt::Display) produces exactly these spellings, so
//! `s.parse::<DType>()` inverts `dtype.to_string()`.

use std::fmt;
use std::str::FromStr;

use snafu::OptionExt;

use crate::error::{Error, Result, UnrecognizedTypeSnafu, UnsupportedWidthSnafu};
use crate::{DType, MAX_INT_WIDTH};

impl DType {
    pub fn parse(spec: &str) -> Result<Self> {
        let unrecognized = || UnrecognizedTypeSnafu { spec: spec.to_string() };

        if spec == "index" {
            return Ok(Self::Index);
        }

        if let Some(rest) = spec.strip_prefix("uint") {
            return Ok(Self::UInt { width: int_width(rest).context(unrecognized())?? });
        }
        if let Some(rest) = spec.strip_prefix("int") {
            return Ok(Self::Int { width: int_width(rest).context(unrecognized())?? });
        }
        if let Some(rest) = spec.strip_prefix("ufixed") {
            let (width, frac) = fixed_parts(rest).context(unrecognized())??;
            return Ok(Self::UFixed { width, frac });
        }
        if let Some(rest) = spec.strip_prefix("fixed") {
            let (width, frac) = fixed_parts(rest).context(unrecognized())??;
            return Ok(Self::Fixed { width, frac });
        }
        match spec.strip_prefix("float") {
            Some("16") => Ok(Self::Float16),
            Some("32") => Ok(Self::Float32),
            Some("64") => Ok(Self::Float64),
            _ => unrecognized().fail(),
        }
    }
}

/// Decimal width without sign or leading `+`.
fn number(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// `None` for malformed text, `Some(Err)` for a well-formed but too wide integer.
fn int_width(text: &str) -> Option<Result<u32>> {
    let width = number(text).filter(|&w| w > 0)?;
    Some(if width > MAX_INT_WIDTH { UnsupportedWidthSnafu { width }.fail() } else { Ok(width) })
}

/// `<W>_<F>` with `0 < W` and `F <= W`; too wide like [`int_width`].
fn fixed_parts(text: &str) -> Option<Result<(u32, u32)>> {
    let (width, frac) = text.split_once('_')?;
    let (width, frac) = (number(width)?, number(frac)?);
    if width == 0 || frac > width {
        return None;
    }
    Some(if width > MAX_INT_WIDTH { UnsupportedWidthSnafu { width }.fail() } else { Ok((width, frac)) })
}

impl FromStr for DType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int { width } => write!(f, "int{width}"),
            Self::UInt { width } => write!(f, "uint{width}"),
            Self::Index => f.write_str("index"),
            Self::Fixed { width, frac } => write!(f, "fixed{width}_{frac}"),
            Self::UFixed { width, frac } => write!(f, "ufixed{width}_{frac}"),
            Self::Float16 => f.write_str("float16"),
            Self::Float32 => f.write_str("float32"),
            Self::Float64 => f.write_str("float64"),
        }
    }
}

impl TryFrom<&str> for DType {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}
