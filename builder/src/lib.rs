//! Expression builder for the kiln hardware compiler front end.
//!
//! Kernels are written as trees of [`Expr`] nodes over named [`Tensor`]s.
//! A [`BuilderContext`] owns the IR module being produced and turns those
//! trees into affine IR, either as each node is created ([`BuildMode::InPlace`])
//! or when a statement is built ([`BuildMode::Deferred`]).
//!
//! - [`promote`] - C-style type promotion and fixed point regularization
//! - [`affine`] - affine maps from index expressions
//! - [`reduce`] - accumulator loop nests for `sum`/`min`/`max`
//! - [`visitor`] - node-by-node materialization
//!
//! ```ignore
//! let a = Tensor::placeholder("A", [10], DType::int32());
//! let out = Tensor::placeholder("out", [1], DType::int32());
//! let mut ctx = BuilderContext::builder().mode(BuildMode::Deferred).build();
//! ctx.function("kernel", &[a.clone(), out.clone()], |ctx| {
//!     let k = ctx.reduce_axis(0, 10, "k");
//!     let x = ctx.load(&a, &[(&k).into()])?;
//!     let total = ctx.sum(x, &[k])?;
//!     let store = ctx.set_scalar(&out, total)?;
//!     ctx.build(&store)?;
//!     Ok(None)
//! })?;
//! ```

pub mod affine;
pub mod config;
pub mod context;
pub mod control;
pub mod error;
pub mod expr;
pub mod insertion;
pub mod ops;
pub mod promote;
pub mod reduce;
pub mod tensor;
pub mod visitor;

#[cfg(test)]
mod test;

pub use affine::AffineExtractor;
pub use config::BuildMode;
pub use context::BuilderContext;
pub use error::{Error, Result};
pub use expr::{
    BinaryKind, Binding, Bound, CallArg, Expr, ExprKind, ExprNode, IntoExpr, Literal, Predicate, ReduceKind,
    UnaryKind, render_tree,
};
pub use insertion::InsertionStack;
pub use tensor::{IndexArg, Indexed, Tensor, TensorSlice};

pub use kiln_dtype::DType;
