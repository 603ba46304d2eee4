//! Expression nodes.
//!
//! An [`Expr`] is an immutable, reference-counted node recording one
//! computation and its result dtype. The only mutable part of a node is its
//! binding: the IR value (or statement op) it was materialized into, cached so
//! that a node shared by several parents is emitted once.

mod tree;

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use kiln_dtype::DType;
use kiln_ir::{OpId, Value};
use smallvec::SmallVec;

use crate::context::BuilderContext;
use crate::error::Result;
use crate::tensor::Tensor;

pub use tree::render_tree;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

pub(crate) fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

pub type Expr = Rc<ExprNode>;

/// Literal payload of a constant node. Its dtype lives on the node.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display)]
pub enum Literal {
    Int(i64),
    Float(f64),
}

/// Loop bound: a literal or a runtime expression.
#[derive(Debug, Clone)]
pub enum Bound {
    Const(i64),
    Expr(Expr),
}

impl From<i64> for Bound {
    fn from(value: i64) -> Self {
        Self::Const(value)
    }
}

impl From<i32> for Bound {
    fn from(value: i32) -> Self {
        Self::Const(value as i64)
    }
}

impl From<usize> for Bound {
    fn from(value: usize) -> Self {
        Self::Const(value as i64)
    }
}

impl From<Expr> for Bound {
    fn from(expr: Expr) -> Self {
        Self::Expr(expr)
    }
}

impl From<&Expr> for Bound {
    fn from(expr: &Expr) -> Self {
        Self::Expr(expr.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum UnaryKind {
    Neg,
    Exp,
    Log,
    Log2,
    Log10,
    Sqrt,
    Sin,
    Cos,
    Tanh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum BinaryKind {
    Add,
    Sub,
    Mul,
    /// Truncating division for integers.
    Div,
    FloorDiv,
    Rem,
    Shl,
    Shr,
    And,
    Or,
    Xor,
}

impl BinaryKind {
    /// Shift and bitwise operators, which skip the promotion engine.
    pub fn is_bitwise(&self) -> bool {
        matches!(self, Self::Shl | Self::Shr | Self::And | Self::Or | Self::Xor)
    }
}

/// Comparison tag, resolved to a target predicate code at materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Predicate {
    Lt,
    Le,
    Eq,
    Ne,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ReduceKind {
    Sum,
    Min,
    Max,
}

/// Argument of a function call.
#[derive(Debug, Clone)]
pub enum CallArg {
    Expr(Expr),
    Tensor(Tensor),
}

impl From<Expr> for CallArg {
    fn from(expr: Expr) -> Self {
        Self::Expr(expr)
    }
}

impl From<&Expr> for CallArg {
    fn from(expr: &Expr) -> Self {
        Self::Expr(expr.clone())
    }
}

impl From<&Tensor> for CallArg {
    fn from(tensor: &Tensor) -> Self {
        Self::Tensor(tensor.clone())
    }
}

#[derive(Debug, Clone, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ExprKind {
    Constant(Literal),
    /// Loop variable. Reduction axes carry their bounds and stay unbound
    /// until the reduction opens their loop.
    InductionVar { name: String, bounds: Option<(Bound, Bound)> },
    Unary { op: UnaryKind, operand: Expr },
    Binary { op: BinaryKind, lhs: Expr, rhs: Expr },
    Compare { predicate: Predicate, lhs: Expr, rhs: Expr },
    Cast { source: Expr },
    Load { tensor: Tensor, indices: SmallVec<[Expr; 4]> },
    Store { value: Expr, tensor: Tensor, indices: SmallVec<[Expr; 4]> },
    Select { cond: Expr, then_value: Expr, else_value: Expr },
    Call { callee: String, args: Vec<CallArg> },
    GetBit { value: Expr, bit: Expr },
    Reduce { op: ReduceKind, body: Expr, axes: SmallVec<[Expr; 2]> },
}

/// What a node was materialized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Value(Value),
    /// Statement without a result.
    Op(OpId),
}

impl Binding {
    pub fn value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Op(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct ExprNode {
    id: u64,
    kind: ExprKind,
    /// `None` for statements and calls without a result.
    dtype: Option<DType>,
    binding: Cell<Option<Binding>>,
}

impl ExprNode {
    pub(crate) fn new(kind: ExprKind, dtype: Option<DType>) -> Expr {
        Rc::new(Self { id: next_id(), kind, dtype, binding: Cell::new(None) })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    pub fn dtype(&self) -> Option<DType> {
        self.dtype
    }

    /// Node kind name, e.g. `binary` or `load`.
    pub fn name(&self) -> &'static str {
        (&self.kind).into()
    }

    pub fn binding(&self) -> Option<Binding> {
        self.binding.get()
    }

    pub fn is_built(&self) -> bool {
        self.binding.get().is_some()
    }

    pub(crate) fn bind(&self, binding: Binding) {
        self.binding.set(Some(binding));
    }

    pub(crate) fn unbind(&self) {
        self.binding.set(None);
    }

    pub fn is_statement(&self) -> bool {
        self.dtype.is_none()
    }

    pub fn is_load(&self) -> bool {
        matches!(self.kind, ExprKind::Load { .. })
    }

    /// Direct expression operands, in evaluation order.
    pub fn operands(&self) -> SmallVec<[Expr; 4]> {
        match &self.kind {
            ExprKind::Constant(_) | ExprKind::InductionVar { .. } => SmallVec::new(),
            ExprKind::Unary { operand, .. } => smallvec::smallvec![operand.clone()],
            ExprKind::Binary { lhs, rhs, .. } | ExprKind::Compare { lhs, rhs, .. } => {
                smallvec::smallvec![lhs.clone(), rhs.clone()]
            }
            ExprKind::Cast { source } => smallvec::smallvec![source.clone()],
            ExprKind::Load { indices, .. } => indices.clone(),
            ExprKind::Store { value, indices, .. } => std::iter::once(value).chain(indices).cloned().collect(),
            ExprKind::Select { cond, then_value, else_value } => {
                smallvec::smallvec![cond.clone(), then_value.clone(), else_value.clone()]
            }
            ExprKind::Call { args, .. } => args
                .iter()
                .filter_map(|arg| match arg {
                    CallArg::Expr(expr) => Some(expr.clone()),
                    CallArg::Tensor(_) => None,
                })
                .collect(),
            ExprKind::GetBit { value, bit } => smallvec::smallvec![value.clone(), bit.clone()],
            ExprKind::Reduce { body, axes, .. } => std::iter::once(body).chain(axes).cloned().collect(),
        }
    }

    /// Induction variable name, if this is one.
    pub fn iv_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::InductionVar { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Operand accepted by node constructors.
///
/// Integer literals become `int32` constants and float literals `float32`
/// constants; the promotion engine then widens them as needed.
pub trait IntoExpr {
    fn into_expr(self, ctx: &mut BuilderContext) -> Result<Expr>;
}

impl IntoExpr for Expr {
    fn into_expr(self, _ctx: &mut BuilderContext) -> Result<Expr> {
        Ok(self)
    }
}

impl IntoExpr for &Expr {
    fn into_expr(self, _ctx: &mut BuilderContext) -> Result<Expr> {
        Ok(self.clone())
    }
}

impl IntoExpr for i64 {
    fn into_expr(self, ctx: &mut BuilderContext) -> Result<Expr> {
        ctx.constant(Literal::Int(self), DType::int32())
    }
}

impl IntoExpr for i32 {
    fn into_expr(self, ctx: &mut BuilderContext) -> Result<Expr> {
        ctx.constant(Literal::Int(self as i64), DType::int32())
    }
}

impl IntoExpr for f64 {
    fn into_expr(self, ctx: &mut BuilderContext) -> Result<Expr> {
        ctx.constant(Literal::Float(self), DType::Float32)
    }
}

impl IntoExpr for f32 {
    fn into_expr(self, ctx: &mut BuilderContext) -> Result<Expr> {
        ctx.constant(Literal::Float(self as f64), DType::Float32)
    }
}
