//! Materialization of expression trees into IR.
//!
//! [`BuilderContext::build`] walks a node's operands depth first and emits
//! one operation (occasionally two) per node at the current insertion point.
//! A node is emitted once; later visits return its cached binding until the
//! region it was emitted in is closed.

use kiln_dtype::{Category, DType};
use kiln_ir::{Attribute, CmpFPredicate, CmpIPredicate, OpKind, OperationState, Value};
use snafu::OptionExt;

use crate::context::BuilderContext;
use crate::error::*;
use crate::expr::{BinaryKind, Binding, CallArg, Expr, ExprKind, Literal, Predicate, UnaryKind};

/// Operation for an arithmetic or bitwise operator on `dtype`.
pub fn binary_op_kind(op: BinaryKind, dtype: DType) -> Result<OpKind> {
    use BinaryKind::*;

    let unsigned = dtype.is_unsigned();
    Ok(match (op, dtype.category()) {
        (Add, Category::Int) => OpKind::AddI,
        (Sub, Category::Int) => OpKind::SubI,
        (Mul, Category::Int) => OpKind::MulI,
        (Div | FloorDiv, Category::Int) if unsigned => OpKind::DivUI,
        (Div, Category::Int) => OpKind::DivSI,
        (FloorDiv, Category::Int) => OpKind::FloorDivSI,
        (Rem, Category::Int) if unsigned => OpKind::RemUI,
        (Rem, Category::Int) => OpKind::RemSI,
        (Shl, Category::Int) => OpKind::ShLI,
        (Shr, Category::Int) if unsigned => OpKind::ShRUI,
        (Shr, Category::Int) => OpKind::ShRSI,
        (And, Category::Int) => OpKind::AndI,
        (Or, Category::Int) => OpKind::OrI,
        (Xor, Category::Int) => OpKind::XOrI,

        (Add, Category::Float) => OpKind::AddF,
        (Sub, Category::Float) => OpKind::SubF,
        (Mul, Category::Float) => OpKind::MulF,
        (Div | FloorDiv, Category::Float) => OpKind::DivF,
        (Rem, Category::Float) => OpKind::RemF,

        (Add, Category::Fixed) => OpKind::AddFixed,
        (Sub, Category::Fixed) => OpKind::SubFixed,
        (Mul, Category::Fixed) => OpKind::MulFixed,
        (Div, Category::Fixed) => OpKind::DivFixed,

        _ => return UnsupportedOperationSnafu { op: <&'static str>::from(op), dtype }.fail(),
    })
}

/// Integer (and fixed point) predicate for a comparison tag.
pub fn int_predicate(predicate: Predicate, unsigned: bool) -> CmpIPredicate {
    match (predicate, unsigned) {
        (Predicate::Eq, _) => CmpIPredicate::Eq,
        (Predicate::Ne, _) => CmpIPredicate::Ne,
        (Predicate::Lt, false) => CmpIPredicate::Slt,
        (Predicate::Le, false) => CmpIPredicate::Sle,
        (Predicate::Gt, false) => CmpIPredicate::Sgt,
        (Predicate::Ge, false) => CmpIPredicate::Sge,
        (Predicate::Lt, true) => CmpIPredicate::Ult,
        (Predicate::Le, true) => CmpIPredicate::Ule,
        (Predicate::Gt, true) => CmpIPredicate::Ugt,
        (Predicate::Ge, true) => CmpIPredicate::Uge,
    }
}

/// Floating point predicate; always the ordered family.
pub fn float_predicate(predicate: Predicate) -> CmpFPredicate {
    match predicate {
        Predicate::Lt => CmpFPredicate::Olt,
        Predicate::Le => CmpFPredicate::Ole,
        Predicate::Eq => CmpFPredicate::Oeq,
        Predicate::Ne => CmpFPredicate::One,
        Predicate::Gt => CmpFPredicate::Ogt,
        Predicate::Ge => CmpFPredicate::Oge,
    }
}

/// Predicate code of a comparison on operands of `dtype`.
pub fn predicate_code(predicate: Predicate, dtype: DType) -> i64 {
    match dtype.category() {
        Category::Float => float_predicate(predicate).code(),
        Category::Int | Category::Fixed => int_predicate(predicate, dtype.is_unsigned()).code(),
    }
}

fn unary_op_kind(op: UnaryKind) -> OpKind {
    match op {
        UnaryKind::Neg => OpKind::NegF,
        UnaryKind::Exp => OpKind::Exp,
        UnaryKind::Log => OpKind::Log,
        UnaryKind::Log2 => OpKind::Log2,
        UnaryKind::Log10 => OpKind::Log10,
        UnaryKind::Sqrt => OpKind::Sqrt,
        UnaryKind::Sin => OpKind::Sin,
        UnaryKind::Cos => OpKind::Cos,
        UnaryKind::Tanh => OpKind::Tanh,
    }
}

/// `value` attribute of a constant. Fixed point literals are stored as their
/// raw scaled integer.
pub fn constant_attr(value: Literal, dtype: DType) -> Attribute {
    let scale = |frac: u32| 2f64.powi(frac as i32);
    match (value, dtype) {
        (Literal::Int(v), DType::Fixed { frac, .. } | DType::UFixed { frac, .. }) => {
            Attribute::Int { value: ((v as i128) << frac) as i64, ty: dtype }
        }
        (Literal::Float(x), DType::Fixed { frac, .. } | DType::UFixed { frac, .. }) => {
            Attribute::Int { value: (x * scale(frac)).round() as i64, ty: dtype }
        }
        (Literal::Int(v), _) if dtype.is_float() => Attribute::Float { value: v as f64, ty: dtype },
        (Literal::Float(x), _) if dtype.is_float() => Attribute::Float { value: x, ty: dtype },
        (Literal::Int(v), _) => Attribute::Int { value: v, ty: dtype },
        (Literal::Float(x), _) => Attribute::Int { value: x.trunc() as i64, ty: dtype },
    }
}

/// Conversion operation between two dtypes.
pub fn cast_op_kind(from: DType, to: DType) -> OpKind {
    if (from.is_int() && to.is_index()) || (from.is_index() && to.is_int()) {
        OpKind::IndexCast
    } else {
        OpKind::UnrealizedCast
    }
}

impl BuilderContext {
    /// Materialize `expr` and its operands at the current insertion point.
    pub fn build(&mut self, expr: &Expr) -> Result<Binding> {
        if let Some(binding) = expr.binding() {
            return Ok(binding);
        }
        let binding = self.materialize(expr)?;
        self.bind_node(expr, binding);
        Ok(binding)
    }

    /// Materialize a value-producing node.
    pub fn build_value(&mut self, expr: &Expr) -> Result<Value> {
        self.build(expr)?.value().context(NoResultValueSnafu { node: expr.name() })
    }

    /// Materialize statements in order.
    pub fn build_all(&mut self, exprs: &[Expr]) -> Result<()> {
        for expr in exprs {
            self.build(expr)?;
        }
        Ok(())
    }

    pub(crate) fn emit_constant(&mut self, value: Literal, dtype: DType) -> Result<Value> {
        self.create_value(
            OperationState::new(OpKind::Constant).result(dtype).attr("value", constant_attr(value, dtype)),
        )
    }

    pub(crate) fn emit_cast(&mut self, value: Value, from: DType, to: DType) -> Result<Value> {
        if from == to {
            return Ok(value);
        }
        self.create_value(OperationState::new(cast_op_kind(from, to)).operands([value]).result(to))
    }

    fn materialize(&mut self, expr: &Expr) -> Result<Binding> {
        tracing::debug!(node = expr.id(), kind = expr.name(), "materialize");
        let dtype = expr.dtype();
        let result_dtype = || dtype.context(NoResultValueSnafu { node: expr.name() });

        let value = match expr.kind() {
            ExprKind::Constant(value) => self.emit_constant(*value, result_dtype()?)?,

            ExprKind::InductionVar { name, .. } => return UnboundInductionVariableSnafu { name }.fail(),

            ExprKind::Unary { op, operand } => {
                let x = self.build_value(operand)?;
                self.create_value(OperationState::new(unary_op_kind(*op)).operands([x]).result(result_dtype()?))?
            }

            ExprKind::Binary { op, lhs, rhs } => {
                let dtype = result_dtype()?;
                let (a, b) = (self.build_value(lhs)?, self.build_value(rhs)?);
                let kind = binary_op_kind(*op, dtype)?;
                let quotient = self.create_value(OperationState::new(kind).operands([a, b]).result(dtype))?;
                if *op == BinaryKind::FloorDiv && dtype.is_float() {
                    self.create_value(OperationState::new(OpKind::Floor).operands([quotient]).result(dtype))?
                } else {
                    quotient
                }
            }

            ExprKind::Compare { predicate, lhs, rhs } => {
                let operand_dtype = Self::value_dtype(lhs)?;
                let (a, b) = (self.build_value(lhs)?, self.build_value(rhs)?);
                self.create_value(
                    OperationState::new(OpKind::compare_for(operand_dtype.category()))
                        .operands([a, b])
                        .result(DType::bool_())
                        .attr("predicate", Attribute::i64(predicate_code(*predicate, operand_dtype))),
                )?
            }

            ExprKind::Cast { source } => {
                let from = Self::value_dtype(source)?;
                let value = self.build_value(source)?;
                self.emit_cast(value, from, result_dtype()?)?
            }

            ExprKind::Load { tensor, indices } => {
                let memref = tensor.storage().context(UnboundTensorSnafu { name: tensor.name() })?;
                let access = self.affine_access(indices)?;
                self.create_value(
                    OperationState::new(OpKind::AffineLoad)
                        .operands(std::iter::once(memref).chain(access.operands))
                        .result(result_dtype()?)
                        .attr("map", Attribute::AffineMap(access.map))
                        .attr("name", Attribute::str(tensor.name())),
                )?
            }

            ExprKind::Store { value, tensor, indices } => {
                let value = self.build_value(value)?;
                let memref = tensor.storage().context(UnboundTensorSnafu { name: tensor.name() })?;
                let access = self.affine_access(indices)?;
                let op = self.create(
                    OperationState::new(OpKind::AffineStore)
                        .operands([value, memref].into_iter().chain(access.operands))
                        .attr("map", Attribute::AffineMap(access.map))
                        .attr("name", Attribute::str(tensor.name())),
                )?;
                return Ok(Binding::Op(op));
            }

            ExprKind::Select { cond, then_value, else_value } => {
                let c = self.build_value(cond)?;
                let (t, e) = (self.build_value(then_value)?, self.build_value(else_value)?);
                self.create_value(OperationState::new(OpKind::Select).operands([c, t, e]).result(result_dtype()?))?
            }

            ExprKind::Call { callee, args } => {
                let mut operands = Vec::with_capacity(args.len());
                for arg in args {
                    operands.push(match arg {
                        CallArg::Expr(expr) => self.build_value(expr)?,
                        CallArg::Tensor(tensor) => {
                            tensor.storage().context(UnboundTensorSnafu { name: tensor.name() })?
                        }
                    });
                }
                let mut state = OperationState::new(OpKind::Call)
                    .operands(operands)
                    .attr("callee", Attribute::SymbolRef(callee.clone()));
                if let Some(dtype) = dtype {
                    state = state.result(dtype);
                }
                let op = self.create(state)?;
                return Ok(match self.module().result(op) {
                    Some(value) => Binding::Value(value),
                    None => Binding::Op(op),
                });
            }

            ExprKind::GetBit { value, bit } => {
                let (v, b) = (self.build_value(value)?, self.build_value(bit)?);
                self.create_value(OperationState::new(OpKind::GetBit).operands([v, b]).result(DType::bool_()))?
            }

            ExprKind::Reduce { op, body, axes } => self.build_reduce(*op, body, axes, result_dtype()?)?,
        };
        Ok(Binding::Value(value))
    }
}
