//! Target IR for the kiln expression builder.
//!
//! A small affine-dialect IR in the shape of MLIR: operations with typed
//! results, named attributes and single-block regions, created at an explicit
//! [`InsertionPoint`].
//!
//! - [`types`] - value types and attributes
//! - [`affine`] - affine expressions, maps and integer sets
//! - [`op`] - operation kinds and comparison predicates
//! - [`module`] - the operation/block arena and `create`
//! - [`interp`] - reference interpreter over host buffers

pub mod affine;
pub mod error;
pub mod interp;
pub mod loops;
pub mod module;
pub mod op;
mod printer;
pub mod types;


pub use affine::{AffineExpr, AffineKind, AffineMap, IntegerSet};
pub use error::{Error, Result};
pub use loops::{LoopBand, LoopInfo};
pub use module::{Block, BlockId, InsertionPoint, Module, OpId, Operation, OperationState, Value};
pub use op::{CmpFPredicate, CmpIPredicate, OpKind};
pub use types::{Attribute, Shape, Type};
