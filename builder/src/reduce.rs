//! Reduction synthesis.
//!
//! A reduce node becomes a one-element accumulator buffer, initialized with
//! the identity of the reduction, updated inside a perfect loop nest with one
//! loop per axis, and read back once the nest is closed:
//!
//! ```text
//! %acc = memref.alloc() {name = "sum_rv"} : memref<1xT>
//! affine.store %init, %acc[0]
//! affine.for %k = lb to ub {
//!   %v = affine.load %acc[0]
//!   affine.store (body + %v), %acc[0]
//! }
//! %result = affine.load %acc[0]
//! ```

use kiln_dtype::{Category, DType};
use kiln_ir::{AffineExpr, AffineMap, Attribute, InsertionPoint, OpKind, OperationState, Type, Value};
use snafu::ensure;

use crate::context::BuilderContext;
use crate::error::*;
use crate::expr::{Binding, Expr, ExprKind, Literal, ReduceKind};
use crate::visitor::constant_attr;

/// Initial accumulator value: zero for sums, the largest (smallest) value of
/// the dtype for min (max).
pub fn reduction_identity(op: ReduceKind, dtype: DType) -> Attribute {
    match op {
        ReduceKind::Sum => constant_attr(Literal::Int(0), dtype),
        ReduceKind::Min if dtype.is_float() => Attribute::Float { value: f64::INFINITY, ty: dtype },
        ReduceKind::Max if dtype.is_float() => Attribute::Float { value: f64::NEG_INFINITY, ty: dtype },
        // `uint64` keeps its bit pattern.
        ReduceKind::Min => Attribute::Int { value: dtype.raw_max().unwrap_or_default() as i64, ty: dtype },
        ReduceKind::Max => Attribute::Int { value: dtype.raw_min().unwrap_or_default() as i64, ty: dtype },
    }
}

/// Operation combining the body value with the accumulator.
pub fn combine_op_kind(op: ReduceKind, dtype: DType) -> OpKind {
    let unsigned = dtype.is_unsigned();
    match (op, dtype.category()) {
        (ReduceKind::Sum, Category::Int) => OpKind::AddI,
        (ReduceKind::Sum, Category::Float) => OpKind::AddF,
        (ReduceKind::Sum, Category::Fixed) => OpKind::AddFixed,
        (ReduceKind::Min, Category::Int) if unsigned => OpKind::MinUI,
        (ReduceKind::Min, Category::Int) => OpKind::MinSI,
        (ReduceKind::Min, Category::Float) => OpKind::MinF,
        (ReduceKind::Min, Category::Fixed) => OpKind::MinFixed,
        (ReduceKind::Max, Category::Int) if unsigned => OpKind::MaxUI,
        (ReduceKind::Max, Category::Int) => OpKind::MaxSI,
        (ReduceKind::Max, Category::Float) => OpKind::MaxF,
        (ReduceKind::Max, Category::Fixed) => OpKind::MaxFixed,
    }
}

/// The accumulator and how it is addressed.
struct Accumulator {
    buffer: Value,
    /// `index` constant 0, bound to the map's only symbol.
    zero: Value,
    name: String,
    dtype: DType,
}

impl Accumulator {
    fn map() -> Attribute {
        Attribute::AffineMap(AffineMap::new(0, 1, [AffineExpr::symbol(0)]))
    }

    fn load(&self, ctx: &mut BuilderContext) -> Result<Value> {
        ctx.create_value(
            OperationState::new(OpKind::AffineLoad)
                .operands([self.buffer, self.zero])
                .result(self.dtype)
                .attr("map", Self::map())
                .attr("name", Attribute::str(&self.name)),
        )
    }

    fn store(&self, ctx: &mut BuilderContext, value: Value) -> Result<()> {
        ctx.create(
            OperationState::new(OpKind::AffineStore)
                .operands([value, self.buffer, self.zero])
                .attr("map", Self::map())
                .attr("name", Attribute::str(&self.name)),
        )?;
        Ok(())
    }
}

impl BuilderContext {
    pub(crate) fn build_reduce(&mut self, op: ReduceKind, body: &Expr, axes: &[Expr], dtype: DType) -> Result<Value> {
        let name = format!("{op}_rv");
        tracing::debug!(%op, %dtype, axes = axes.len(), "synthesize reduction");

        let buffer = self.create_value(
            OperationState::new(OpKind::Alloc).result(Type::memref([1], dtype)).attr("name", Attribute::str(&name)),
        )?;
        let zero = self.emit_constant(Literal::Int(0), DType::Index)?;
        let acc = Accumulator { buffer, zero, name, dtype };

        let init = self.create_value(
            OperationState::new(OpKind::Constant).result(dtype).attr("value", reduction_identity(op, dtype)),
        )?;
        acc.store(self, init)?;

        self.local_bindings(|ctx| {
            ctx.scoped(|ctx| {
                for axis in axes {
                    let ExprKind::InductionVar { name, bounds: Some((lower, upper)) } = axis.kind() else {
                        let name = axis.iv_name().unwrap_or(axis.name());
                        return MissingAxisBoundsSnafu { name }.fail();
                    };
                    let header = ctx.emit_for(lower, upper, 1, Some(name), None, true)?;
                    ctx.bind_node(axis, Binding::Value(header.iv));
                    ctx.stack_mut().save(InsertionPoint::at_end(header.body));
                }

                let actual = Self::value_dtype(body)?;
                ensure!(actual == dtype, ReductionTypeMismatchSnafu { expected: dtype, actual });
                let data = ctx.build_value(body)?;
                let current = acc.load(ctx)?;
                let combined = ctx.create_value(
                    OperationState::new(combine_op_kind(op, dtype)).operands([data, current]).result(dtype),
                )?;
                acc.store(ctx, combined)?;

                for _ in axes {
                    ctx.emit_yield()?;
                    ctx.stack_mut().restore()?;
                }
                Ok(())
            })
        })?;

        acc.load(self)
    }
}
