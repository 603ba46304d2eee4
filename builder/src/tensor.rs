//! Named tensors, partial slices and indexing.
//!
//! Indexing a tensor with fewer indices than its rank accumulates them into a
//! [`TensorSlice`]; once the rank is reached the result is a load node.
//! Assignment is only possible on fully indexed targets.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use kiln_dtype::DType;
use kiln_ir::{Shape, Value};
use smallvec::SmallVec;
use snafu::{OptionExt, ensure};

use crate::context::BuilderContext;
use crate::error::*;
use crate::expr::{Expr, ExprKind, ExprNode, IntoExpr, Literal, next_id};

#[derive(Debug)]
struct TensorData {
    id: u64,
    name: String,
    shape: Shape,
    dtype: DType,
    storage: Cell<Option<Value>>,
}

/// Handle to a named buffer. Clones share identity.
#[derive(Clone)]
pub struct Tensor {
    data: Rc<TensorData>,
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor({:?}, {:?}, {})", self.data.name, self.data.shape.as_slice(), self.data.dtype)
    }
}

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl Tensor {
    /// Tensor without storage yet; bind it with [`BuilderContext::alloc_tensor`]
    /// or as a function argument.
    pub fn placeholder(name: impl Into<String>, shape: impl IntoIterator<Item = usize>, dtype: DType) -> Self {
        Self {
            data: Rc::new(TensorData {
                id: next_id(),
                name: name.into(),
                shape: shape.into_iter().collect(),
                dtype,
                storage: Cell::new(None),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.data.id
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn shape(&self) -> &[usize] {
        &self.data.shape
    }

    pub fn rank(&self) -> usize {
        self.data.shape.len()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DType {
        self.data.dtype
    }

    /// The memref value backing this tensor, once allocated or bound.
    pub fn storage(&self) -> Option<Value> {
        self.data.storage.get()
    }

    pub fn is_bound(&self) -> bool {
        self.storage().is_some()
    }

    pub(crate) fn bind(&self, value: Value) {
        self.data.storage.set(Some(value));
    }
}

/// Partially indexed tensor.
#[derive(Debug, Clone)]
pub struct TensorSlice {
    tensor: Tensor,
    indices: SmallVec<[Expr; 4]>,
}

impl TensorSlice {
    pub fn tensor(&self) -> &Tensor {
        &self.tensor
    }

    pub fn indices(&self) -> &[Expr] {
        &self.indices
    }

    /// Shape of the remaining, unindexed dimensions.
    pub fn shape(&self) -> &[usize] {
        &self.tensor.shape()[self.indices.len()..]
    }

    pub fn dtype(&self) -> DType {
        self.tensor.dtype()
    }
}

/// One index position: an expression, or an integer literal that becomes an
/// `index` constant.
#[derive(Debug, Clone)]
pub enum IndexArg {
    Expr(Expr),
    Const(i64),
}

impl From<Expr> for IndexArg {
    fn from(expr: Expr) -> Self {
        Self::Expr(expr)
    }
}

impl From<&Expr> for IndexArg {
    fn from(expr: &Expr) -> Self {
        Self::Expr(expr.clone())
    }
}

impl From<i64> for IndexArg {
    fn from(value: i64) -> Self {
        Self::Const(value)
    }
}

impl From<i32> for IndexArg {
    fn from(value: i32) -> Self {
        Self::Const(value as i64)
    }
}

impl From<usize> for IndexArg {
    fn from(value: usize) -> Self {
        Self::Const(value as i64)
    }
}

/// Result of applying indices.
#[derive(Debug, Clone)]
pub enum Indexed {
    Slice(TensorSlice),
    Load(Expr),
}

impl Indexed {
    pub fn into_load(self) -> Option<Expr> {
        match self {
            Self::Load(expr) => Some(expr),
            Self::Slice(_) => None,
        }
    }

    pub fn into_slice(self) -> Option<TensorSlice> {
        match self {
            Self::Slice(slice) => Some(slice),
            Self::Load(_) => None,
        }
    }
}

impl BuilderContext {
    fn index_expr(&mut self, arg: &IndexArg) -> Result<Expr> {
        match arg {
            IndexArg::Expr(expr) => Ok(expr.clone()),
            IndexArg::Const(value) => self.constant(Literal::Int(*value), DType::Index),
        }
    }

    fn apply_indices(&mut self, tensor: &Tensor, prefix: &[Expr], indices: &[IndexArg]) -> Result<Indexed> {
        let (rank, given) = (tensor.rank(), prefix.len() + indices.len());
        ensure!(given <= rank, TooManyIndicesSnafu { tensor: tensor.name(), rank, given });

        let mut all: SmallVec<[Expr; 4]> = prefix.iter().cloned().collect();
        for arg in indices {
            all.push(self.index_expr(arg)?);
        }

        if given < rank {
            return Ok(Indexed::Slice(TensorSlice { tensor: tensor.clone(), indices: all }));
        }
        let load = self.finish(ExprKind::Load { tensor: tensor.clone(), indices: all }, Some(tensor.dtype()))?;
        Ok(Indexed::Load(load))
    }

    fn store_indices(
        &mut self,
        value: impl IntoExpr,
        tensor: &Tensor,
        prefix: &[Expr],
        indices: &[IndexArg],
    ) -> Result<Expr> {
        let (rank, given) = (tensor.rank(), prefix.len() + indices.len());
        ensure!(given <= rank, TooManyIndicesSnafu { tensor: tensor.name(), rank, given });
        ensure!(given == rank, SliceWriteNotAllowedSnafu { tensor: tensor.name(), rank, given });

        let value = value.into_expr(self)?;
        let dtype = value.dtype().context(NoResultValueSnafu { node: value.name() })?;
        let value = if dtype == tensor.dtype() {
            value
        } else {
            tracing::warn!(tensor = tensor.name(), from = %dtype, to = %tensor.dtype(), "store value cast to tensor dtype");
            self.cast_node(value, tensor.dtype())?
        };

        let mut all: SmallVec<[Expr; 4]> = prefix.iter().cloned().collect();
        for arg in indices {
            all.push(self.index_expr(arg)?);
        }
        self.finish(ExprKind::Store { value, tensor: tensor.clone(), indices: all }, None)
    }

    /// `tensor[indices]`: a slice while fewer indices than the rank are given,
    /// a load once fully indexed.
    pub fn index(&mut self, tensor: &Tensor, indices: &[IndexArg]) -> Result<Indexed> {
        self.apply_indices(tensor, &[], indices)
    }

    /// Continue indexing a slice.
    pub fn index_slice(&mut self, slice: &TensorSlice, indices: &[IndexArg]) -> Result<Indexed> {
        self.apply_indices(&slice.tensor, &slice.indices, indices)
    }

    /// Load one element; `indices` must cover the full rank.
    pub fn load(&mut self, tensor: &Tensor, indices: &[IndexArg]) -> Result<Expr> {
        let given = indices.len();
        self.index(tensor, indices)?
            .into_load()
            .context(IncompleteIndexSnafu { tensor: tensor.name(), rank: tensor.rank(), given })
    }

    /// `tensor[indices] = value`.
    pub fn store(&mut self, value: impl IntoExpr, tensor: &Tensor, indices: &[IndexArg]) -> Result<Expr> {
        self.store_indices(value, tensor, &[], indices)
    }

    /// `slice[indices] = value`; the slice plus `indices` must reach the rank.
    pub fn store_slice(&mut self, value: impl IntoExpr, slice: &TensorSlice, indices: &[IndexArg]) -> Result<Expr> {
        self.store_indices(value, &slice.tensor, &slice.indices, indices)
    }

    fn scalar_indices(tensor: &Tensor) -> Result<SmallVec<[IndexArg; 4]>> {
        ensure!(tensor.len() == 1, ScalarAccessSnafu { tensor: tensor.name(), shape: tensor.shape().to_vec() });
        Ok((0..tensor.rank()).map(|_| IndexArg::Const(0)).collect())
    }

    /// Read a single-element tensor.
    pub fn scalar(&mut self, tensor: &Tensor) -> Result<Expr> {
        let indices = Self::scalar_indices(tensor)?;
        self.load(tensor, &indices)
    }

    /// Write a single-element tensor.
    pub fn set_scalar(&mut self, tensor: &Tensor, value: impl IntoExpr) -> Result<Expr> {
        let indices = Self::scalar_indices(tensor)?;
        self.store(value, tensor, &indices)
    }

    /// `load[bit]`: extract one bit of an integer load.
    pub fn bit(&mut self, load: &Expr, indices: &[IndexArg]) -> Result<Expr> {
        ensure!(load.is_load(), BitAccessSnafu { reason: "bits can only be taken from a load" });
        ensure!(
            load.dtype().is_some_and(|dtype| dtype.is_int()),
            BitAccessSnafu { reason: "bit access requires an integer load" }
        );
        let [index] = indices else {
            return BitAccessSnafu { reason: "bit access takes exactly one index" }.fail();
        };
        let bit = self.index_expr(index)?;
        self.get_bit(load, bit)
    }
}
