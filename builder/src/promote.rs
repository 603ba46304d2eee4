//! Type promotion and implicit casts.
//!
//! Arithmetic and comparison operands are promoted C style: the operand of
//! lower rank is cast towards the higher ranked operand's type, and fixed
//! point operands are then regularized to a common width. Shift and bitwise
//! operators instead cast the right operand to the left operand's type.

use kiln_dtype::DType;
use snafu::{OptionExt, ensure};

use crate::context::BuilderContext;
use crate::error::*;
use crate::expr::{BinaryKind, Expr, ExprKind};

/// Type the lower ranked operand is cast to. A fixed operand below a wider
/// fixed one keeps its type; regularization widens it afterwards.
fn cast_target(high: DType, low: DType) -> Result<DType> {
    match high {
        DType::Float64 => Ok(DType::Float64),
        DType::Float32 => Ok(DType::Float32),
        DType::Int { .. } | DType::UInt { .. } | DType::Index => Ok(high),
        DType::Fixed { frac, .. } | DType::UFixed { frac, .. } if low.is_integer_like() => {
            let width = low.width();
            Ok(if high.is_unsigned() { DType::ufixed(width, frac) } else { DType::fixed(width, frac) })
        }
        DType::Fixed { .. } | DType::UFixed { .. } if low.is_fixed() => Ok(low),
        _ => UnsupportedConversionSnafu { lhs: high, rhs: low }.fail(),
    }
}

/// Result dtypes of the rank-based promotion step.
pub fn promote_dtypes(lhs: DType, rhs: DType) -> Result<(DType, DType)> {
    let (lhs_rank, rhs_rank) = (lhs.rank()?, rhs.rank()?);
    if lhs_rank == rhs_rank {
        return Ok((lhs, rhs));
    }
    if lhs_rank > rhs_rank { Ok((lhs, cast_target(lhs, rhs)?)) } else { Ok((cast_target(rhs, lhs)?, rhs)) }
}

/// Bring fixed point operands to one width with a shared fraction.
pub fn regularize_dtypes(lhs: DType, rhs: DType) -> Result<(DType, DType)> {
    if !lhs.is_fixed() && !rhs.is_fixed() {
        return Ok((lhs, rhs));
    }
    ensure!(lhs.is_fixed() && rhs.is_fixed(), UnsupportedConversionSnafu { lhs, rhs });
    ensure!(lhs.frac() == rhs.frac(), FractionMismatchSnafu { lhs, rhs });

    let width = lhs.width().max(rhs.width());
    Ok((lhs.with_width(width), rhs.with_width(width)))
}

/// Final operand dtypes of an arithmetic or comparison operator.
pub fn binary_dtypes(lhs: DType, rhs: DType) -> Result<(DType, DType)> {
    let (lhs, rhs) = promote_dtypes(lhs, rhs)?;
    regularize_dtypes(lhs, rhs)
}

/// Final operand dtypes of a shift or bitwise operator.
pub fn integer_dtypes(op: BinaryKind, lhs: DType, rhs: DType) -> Result<(DType, DType)> {
    for dtype in [lhs, rhs] {
        ensure!(!dtype.is_float(), FloatingPointNotSupportedSnafu { op, dtype });
        ensure!(!dtype.is_fixed(), UnsupportedOperationSnafu { op: <&'static str>::from(op), dtype });
    }
    Ok((lhs, lhs))
}

impl BuilderContext {
    /// Dtype of a value-producing node.
    pub(crate) fn value_dtype(expr: &Expr) -> Result<DType> {
        expr.dtype().context(NoResultValueSnafu { node: expr.name() })
    }

    /// Cast node from `expr` to `to`; `expr` itself when the dtypes match.
    pub(crate) fn cast_node(&mut self, expr: Expr, to: DType) -> Result<Expr> {
        if Self::value_dtype(&expr)? == to {
            return Ok(expr);
        }
        self.finish(ExprKind::Cast { source: expr }, Some(to))
    }

    /// Cast inserted by promotion, reported as a warning.
    pub(crate) fn implicit_cast(&mut self, expr: Expr, to: DType) -> Result<Expr> {
        let from = Self::value_dtype(&expr)?;
        if from == to {
            return Ok(expr);
        }
        tracing::warn!(node = expr.id(), %from, %to, "implicit cast");
        self.cast_node(expr, to)
    }

    /// Promote both operands of an arithmetic or comparison operator, casting
    /// each at most once.
    pub fn promote(&mut self, lhs: Expr, rhs: Expr) -> Result<(Expr, Expr)> {
        let (lhs_dtype, rhs_dtype) = binary_dtypes(Self::value_dtype(&lhs)?, Self::value_dtype(&rhs)?)?;
        Ok((self.implicit_cast(lhs, lhs_dtype)?, self.implicit_cast(rhs, rhs_dtype)?))
    }

    /// Operand rule of shift and bitwise operators.
    pub fn promote_integer(&mut self, op: BinaryKind, lhs: Expr, rhs: Expr) -> Result<(Expr, Expr)> {
        let (lhs_dtype, rhs_dtype) = integer_dtypes(op, Self::value_dtype(&lhs)?, Self::value_dtype(&rhs)?)?;
        Ok((self.implicit_cast(lhs, lhs_dtype)?, self.implicit_cast(rhs, rhs_dtype)?))
    }
}
