//! Promotion ranking.
//!
//! Integers rank by bit width, `index` sits right above them, fixed point
//! types rank `100 + width` and floats are above everything else. Integer
//! and fixed point widths are capped at [`MAX_INT_WIDTH`], which keeps every
//! fixed rank below the float ranks.

use snafu::ensure;

use crate::error::{Result, UnsupportedWidthSnafu};
use crate::{DType, MAX_INT_WIDTH};

pub const INDEX_RANK: u32 = 65;
pub const FIXED_RANK_BASE: u32 = 100;
pub const FLOAT_RANK_BASE: u32 = 1000;

impl DType {
    /// Position of the type in the promotion order.
    ///
    /// Types of equal rank are promotion-compatible without a cast, e.g.
    /// `int8` and `uint8`.
    pub fn rank(&self) -> Result<u32> {
        Ok(match *self {
            Self::Int { width } | Self::UInt { width } => {
                ensure!(width <= MAX_INT_WIDTH, UnsupportedWidthSnafu { width });
                width
            }
            Self::Index => INDEX_RANK,
            Self::Fixed { width, .. } | Self::UFixed { width, .. } => {
                ensure!(width <= MAX_INT_WIDTH, UnsupportedWidthSnafu { width });
                FIXED_RANK_BASE + width
            }
            Self::Float16 => FLOAT_RANK_BASE + 1,
            Self::Float32 => FLOAT_RANK_BASE + 2,
            Self::Float64 => FLOAT_RANK_BASE + 3,
        })
    }
}
