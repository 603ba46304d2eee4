//! Loops, conditionals, functions and buffers.

use bon::bon;
use kiln_dtype::DType;
use kiln_ir::{AffineMap, Attribute, BlockId, InsertionPoint, IntegerSet, OpId, OpKind, OperationState, Type, Value};
use snafu::ensure;

use crate::context::BuilderContext;
use crate::error::*;
use crate::expr::{Binding, Bound, Expr, ExprKind, ExprNode, IntoExpr};
use crate::tensor::Tensor;

/// An `affine.for` just created, with its body still empty.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LoopHeader {
    pub op: OpId,
    pub body: BlockId,
    pub iv: Value,
}

impl BuilderContext {
    /// Bound map and operand: `() -> (c)` for literals, `(d0) -> (d0)` over an
    /// `index` value otherwise.
    fn bound_operand(&mut self, bound: &Bound) -> Result<(AffineMap, Option<Value>)> {
        match bound {
            Bound::Const(value) => Ok((AffineMap::constant(*value), None)),
            Bound::Expr(expr) => {
                let dtype = Self::value_dtype(expr)?;
                ensure!(dtype.is_integer_like(), UnsupportedOperationSnafu { op: "loop_bound", dtype });
                let value = self.build_value(expr)?;
                let value = self.emit_cast(value, dtype, DType::Index)?;
                Ok((AffineMap::identity(1), Some(value)))
            }
        }
    }

    pub(crate) fn emit_for(
        &mut self,
        lower: &Bound,
        upper: &Bound,
        step: u32,
        name: Option<&str>,
        stage: Option<&str>,
        reduction: bool,
    ) -> Result<LoopHeader> {
        let (lower_map, lower_operand) = self.bound_operand(lower)?;
        let (upper_map, upper_operand) = self.bound_operand(upper)?;

        let mut state = OperationState::new(OpKind::AffineFor)
            .operands(lower_operand.into_iter().chain(upper_operand))
            .attr("lower_bound", Attribute::AffineMap(lower_map))
            .attr("upper_bound", Attribute::AffineMap(upper_map))
            .attr("step", Attribute::index(step.max(1) as i64))
            .region([Type::Scalar(DType::Index)]);
        if let Some(name) = name {
            state = state.attr("loop_name", Attribute::str(name));
        }
        if let Some(stage) = stage {
            state = state.attr("op_name", Attribute::str(stage));
        }
        if reduction {
            state = state.attr("reduction", Attribute::Unit);
        }

        let op = self.create(state)?;
        let body = self.module().op(op).regions[0];
        tracing::debug!(loop = %op, name = name.unwrap_or_default(), "open loop");
        Ok(LoopHeader { op, body, iv: Value::Arg { block: body, index: 0 } })
    }

    pub(crate) fn emit_yield(&mut self) -> Result<OpId> {
        self.create(OperationState::new(OpKind::AffineYield))
    }

    /// Conditional on `cond != 0`, lowered as `affine.if` over
    /// `index_cast(cond)` with the set `(d0) : (d0 - 1 == 0)`.
    pub fn affine_if(&mut self, cond: impl IntoExpr, body: impl FnOnce(&mut Self) -> Result<()>) -> Result<OpId> {
        let cond = cond.into_expr(self)?;
        let dtype = Self::value_dtype(&cond)?;
        ensure!(dtype.is_integer_like(), UnsupportedOperationSnafu { op: "affine_if", dtype });

        let value = self.build_value(&cond)?;
        let index = self.emit_cast(value, dtype, DType::Index)?;
        let op = self.create(
            OperationState::new(OpKind::AffineIf)
                .operands([index])
                .attr("condition", Attribute::IntegerSet(IntegerSet::is_one()))
                .region([]),
        )?;

        let block = self.module().op(op).regions[0];
        self.in_region(InsertionPoint::at_end(block), |ctx| {
            body(ctx)?;
            ctx.emit_yield()?;
            Ok(())
        })?;
        Ok(op)
    }

    /// `func.func @name` taking `args` as memref parameters.
    ///
    /// The body's returned expression, if any, becomes the `func.return` operand.
    pub fn function(
        &mut self,
        name: &str,
        args: &[Tensor],
        body: impl FnOnce(&mut Self) -> Result<Option<Expr>>,
    ) -> Result<OpId> {
        let arg_types = args.iter().map(|arg| Type::memref(arg.shape().iter().copied(), arg.dtype()));
        let op = self.create(OperationState::new(OpKind::Func).attr("sym_name", Attribute::str(name)).region(arg_types))?;

        let block = self.module().op(op).regions[0];
        for (index, arg) in args.iter().enumerate() {
            arg.bind(Value::Arg { block, index: index as u32 });
        }
        tracing::debug!(function = name, args = args.len(), "open function");

        self.in_region(InsertionPoint::at_end(block), |ctx| {
            let returned = match body(ctx)? {
                Some(expr) => Some(ctx.build_value(&expr)?),
                None => None,
            };
            ctx.create(OperationState::new(OpKind::Return).operands(returned))?;
            Ok(())
        })?;
        Ok(op)
    }

    /// Allocate storage for `tensor` at the current insertion point.
    pub fn alloc_tensor(&mut self, tensor: &Tensor) -> Result<Value> {
        tensor.dtype().rank()?;
        let value = self.create_value(
            OperationState::new(OpKind::Alloc)
                .result(Type::memref(tensor.shape().iter().copied(), tensor.dtype()))
                .attr("name", Attribute::str(tensor.name())),
        )?;
        tensor.bind(value);
        Ok(value)
    }

    /// New named buffer.
    pub fn alloc(
        &mut self,
        name: impl Into<String>,
        shape: impl IntoIterator<Item = usize>,
        dtype: DType,
    ) -> Result<Tensor> {
        let tensor = Tensor::placeholder(name, shape, dtype);
        self.alloc_tensor(&tensor)?;
        Ok(tensor)
    }
}

#[bon]
impl BuilderContext {
    /// `affine.for` over `[lower, upper)`; `body` receives the loop variable.
    /// The stage name, if any, is stored as `op_name`.
    ///
    /// ```ignore
    /// ctx.affine_for().lower(0).upper(10).name("i").body(|ctx, i| {
    ///     let x = ctx.load(&a, &[i.into()])?;
    ///     let store = ctx.store(x, &b, &[i.into()])?;
    ///     ctx.build(&store)?;
    ///     Ok(())
    /// }).call()?;
    /// ```
    #[builder]
    pub fn affine_for<F>(
        &mut self,
        #[builder(into)] lower: Bound,
        #[builder(into)] upper: Bound,
        #[builder(default = 1)] step: u32,
        #[builder(into)] name: Option<String>,
        #[builder(into)] stage: Option<String>,
        #[builder(default = false)] reduction: bool,
        body: F,
    ) -> Result<OpId>
    where
        F: FnOnce(&mut BuilderContext, &Expr) -> Result<()>,
    {
        // Only reduction axes carry bounds.
        let iv = ExprNode::new(
            ExprKind::InductionVar { name: name.clone().unwrap_or_default(), bounds: None },
            Some(DType::Index),
        );
        let header = self.emit_for(&lower, &upper, step, name.as_deref(), stage.as_deref(), reduction)?;

        self.in_region(InsertionPoint::at_end(header.body), |ctx| {
            ctx.bind_node(&iv, Binding::Value(header.iv));
            body(ctx, &iv)?;
            ctx.emit_yield()?;
            Ok(())
        })?;
        Ok(header.op)
    }
}
