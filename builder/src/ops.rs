//! Node constructors.
//!
//! Every operator promotes its operands first, then records one node whose
//! dtype is the promoted left operand's dtype (comparisons produce `int1`).

use kiln_dtype::DType;
use snafu::ensure;

use crate::context::BuilderContext;
use crate::error::*;
use crate::expr::{BinaryKind, Bound, CallArg, Expr, ExprKind, IntoExpr, Literal, Predicate, ReduceKind, UnaryKind};

/// Arithmetic, bitwise and comparison shorthands.
macro_rules! impl_operators {
    (
        binary { $($bin_method:ident => $bin_kind:ident),* $(,)? }
        compare { $($cmp_method:ident => $predicate:ident),* $(,)? }
        math { $($math_method:ident => $unary_kind:ident),* $(,)? }
    ) => {
        $(
            pub fn $bin_method(&mut self, lhs: impl IntoExpr, rhs: impl IntoExpr) -> Result<Expr> {
                self.binary(BinaryKind::$bin_kind, lhs, rhs)
            }
        )*

        $(
            pub fn $cmp_method(&mut self, lhs: impl IntoExpr, rhs: impl IntoExpr) -> Result<Expr> {
                self.compare(lhs, rhs, Predicate::$predicate)
            }
        )*

        $(
            pub fn $math_method(&mut self, operand: impl IntoExpr) -> Result<Expr> {
                self.math(UnaryKind::$unary_kind, operand)
            }
        )*
    };
}

impl BuilderContext {
    impl_operators! {
        binary {
            add => Add,
            sub => Sub,
            mul => Mul,
            div => Div,
            floor_div => FloorDiv,
            rem => Rem,
            shl => Shl,
            shr => Shr,
            and => And,
            or => Or,
            xor => Xor,
        }
        compare {
            lt => Lt,
            le => Le,
            eq => Eq,
            ne => Ne,
            gt => Gt,
            ge => Ge,
        }
        math {
            exp => Exp,
            log => Log,
            log2 => Log2,
            log10 => Log10,
            sqrt => Sqrt,
            sin => Sin,
            cos => Cos,
            tanh => Tanh,
        }
    }

    pub fn constant(&mut self, value: Literal, dtype: DType) -> Result<Expr> {
        dtype.rank()?;
        self.finish(ExprKind::Constant(value), Some(dtype))
    }

    pub fn int_const(&mut self, value: i64, dtype: DType) -> Result<Expr> {
        self.constant(Literal::Int(value), dtype)
    }

    pub fn float_const(&mut self, value: f64, dtype: DType) -> Result<Expr> {
        self.constant(Literal::Float(value), dtype)
    }

    pub fn index_const(&mut self, value: i64) -> Result<Expr> {
        self.constant(Literal::Int(value), DType::Index)
    }

    /// Reduction axis over `[lower, upper)`. It has no IR until a reduction
    /// over it is materialized.
    pub fn reduce_axis(&mut self, lower: impl Into<Bound>, upper: impl Into<Bound>, name: impl Into<String>) -> Expr {
        crate::expr::ExprNode::new(
            ExprKind::InductionVar { name: name.into(), bounds: Some((lower.into(), upper.into())) },
            Some(DType::Index),
        )
    }

    /// Explicit conversion; returns `operand` itself when it already has `dtype`.
    pub fn cast(&mut self, operand: impl IntoExpr, dtype: DType) -> Result<Expr> {
        dtype.rank()?;
        let operand = operand.into_expr(self)?;
        self.cast_node(operand, dtype)
    }

    pub fn binary(&mut self, op: BinaryKind, lhs: impl IntoExpr, rhs: impl IntoExpr) -> Result<Expr> {
        let (lhs, rhs) = (lhs.into_expr(self)?, rhs.into_expr(self)?);
        let (lhs, rhs) =
            if op.is_bitwise() { self.promote_integer(op, lhs, rhs)? } else { self.promote(lhs, rhs)? };

        let dtype = Self::value_dtype(&lhs)?;
        ensure!(
            !(dtype.is_fixed() && matches!(op, BinaryKind::FloorDiv | BinaryKind::Rem)),
            UnsupportedOperationSnafu { op: <&'static str>::from(op), dtype }
        );
        self.finish(ExprKind::Binary { op, lhs, rhs }, Some(dtype))
    }

    pub fn compare(&mut self, lhs: impl IntoExpr, rhs: impl IntoExpr, predicate: Predicate) -> Result<Expr> {
        let (lhs, rhs) = (lhs.into_expr(self)?, rhs.into_expr(self)?);
        let (lhs, rhs) = self.promote(lhs, rhs)?;
        self.finish(ExprKind::Compare { predicate, lhs, rhs }, Some(DType::bool_()))
    }

    /// `-x`: `negf` for floats, `0 - x` for integers.
    pub fn neg(&mut self, operand: impl IntoExpr) -> Result<Expr> {
        let operand = operand.into_expr(self)?;
        let dtype = Self::value_dtype(&operand)?;
        ensure!(!dtype.is_fixed(), UnsupportedOperationSnafu { op: "neg", dtype });

        if dtype.is_float() {
            return self.finish(ExprKind::Unary { op: UnaryKind::Neg, operand }, Some(dtype));
        }
        let zero = self.int_const(0, dtype)?;
        self.binary(BinaryKind::Sub, zero, operand)
    }

    /// Math dialect function; the operand is cast to `float32` first.
    pub fn math(&mut self, op: UnaryKind, operand: impl IntoExpr) -> Result<Expr> {
        if op == UnaryKind::Neg {
            return self.neg(operand);
        }
        let operand = operand.into_expr(self)?;
        let operand = self.implicit_cast(operand, DType::Float32)?;
        self.finish(ExprKind::Unary { op, operand }, Some(DType::Float32))
    }

    pub fn select(&mut self, cond: impl IntoExpr, then_value: impl IntoExpr, else_value: impl IntoExpr) -> Result<Expr> {
        let cond = cond.into_expr(self)?;
        let (then_value, else_value) = (then_value.into_expr(self)?, else_value.into_expr(self)?);

        let cond_dtype = Self::value_dtype(&cond)?;
        ensure!(cond_dtype.is_bool(), SelectConditionNotBoolSnafu { dtype: cond_dtype });
        let (then_dtype, else_dtype) = (Self::value_dtype(&then_value)?, Self::value_dtype(&else_value)?);
        ensure!(then_dtype == else_dtype, SelectTypeMismatchSnafu { then_dtype, else_dtype });

        self.finish(ExprKind::Select { cond, then_value, else_value }, Some(then_dtype))
    }

    /// Call of a module function. Without a result dtype the call is a statement.
    pub fn call(&mut self, callee: impl Into<String>, args: &[CallArg], dtype: Option<DType>) -> Result<Expr> {
        if let Some(dtype) = dtype {
            dtype.rank()?;
        }
        self.finish(ExprKind::Call { callee: callee.into(), args: args.to_vec() }, dtype)
    }

    /// Bit `bit` of an integer value, as `int1`.
    pub fn get_bit(&mut self, value: impl IntoExpr, bit: impl IntoExpr) -> Result<Expr> {
        let (value, bit) = (value.into_expr(self)?, bit.into_expr(self)?);
        ensure!(
            Self::value_dtype(&value)?.is_int(),
            BitAccessSnafu { reason: "bit access requires an integer value" }
        );
        ensure!(
            Self::value_dtype(&bit)?.is_integer_like(),
            BitAccessSnafu { reason: "bit position must be an integer" }
        );
        let bit = self.implicit_cast(bit, DType::Index)?;
        self.finish(ExprKind::GetBit { value, bit }, Some(DType::bool_()))
    }

    /// Reduction of `body` over `axes`, accumulated in the body's dtype.
    pub fn reduce(&mut self, op: ReduceKind, body: impl IntoExpr, axes: &[Expr]) -> Result<Expr> {
        let body = body.into_expr(self)?;
        let dtype = Self::value_dtype(&body)?;
        self.reduce_into(op, body, axes, dtype)
    }

    pub fn sum(&mut self, body: impl IntoExpr, axes: &[Expr]) -> Result<Expr> {
        self.reduce(ReduceKind::Sum, body, axes)
    }

    pub fn min(&mut self, body: impl IntoExpr, axes: &[Expr]) -> Result<Expr> {
        self.reduce(ReduceKind::Min, body, axes)
    }

    pub fn max(&mut self, body: impl IntoExpr, axes: &[Expr]) -> Result<Expr> {
        self.reduce(ReduceKind::Max, body, axes)
    }

    /// Reduction with an explicit accumulator dtype, which must match the
    /// body's dtype once materialized.
    pub fn reduce_into(&mut self, op: ReduceKind, body: Expr, axes: &[Expr], dtype: DType) -> Result<Expr> {
        dtype.rank()?;
        self.finish(ExprKind::Reduce { op, body, axes: axes.iter().cloned().collect() }, Some(dtype))
    }
}
