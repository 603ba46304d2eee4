use kiln_dtype::DType;
use snafu::Snafu;

use crate::expr::BinaryKind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Malformed or out-of-range dtype (`UnrecognizedType` / `UnsupportedWidth`).
    #[snafu(display("invalid dtype: {source}"))]
    DTypeSpec { source: kiln_dtype::Error },

    /// Promotion found no common type.
    #[snafu(display("cannot convert between {lhs} and {rhs}"))]
    UnsupportedConversion { lhs: DType, rhs: DType },

    /// Fixed point operands with different fraction widths.
    #[snafu(display("fixed point fraction mismatch: {lhs} vs {rhs}"))]
    FractionMismatch { lhs: DType, rhs: DType },

    /// Shift or bitwise operator on a float operand.
    #[snafu(display("{op} does not support floating point operand {dtype}"))]
    FloatingPointNotSupported { op: BinaryKind, dtype: DType },

    /// Operator undefined for the operand category.
    #[snafu(display("{op} is not supported on {dtype}"))]
    UnsupportedOperation { op: &'static str, dtype: DType },

    #[snafu(display("{given} indices applied to tensor {tensor:?} of rank {rank}"))]
    TooManyIndices { tensor: String, rank: usize, given: usize },

    /// Load requested with fewer indices than the rank.
    #[snafu(display("{given} indices do not fully index tensor {tensor:?} of rank {rank}"))]
    IncompleteIndex { tensor: String, rank: usize, given: usize },

    #[snafu(display("cannot write through a partial slice of {tensor:?} ({given} of {rank} indices)"))]
    SliceWriteNotAllowed { tensor: String, rank: usize, given: usize },

    #[snafu(display("invalid bit access: {reason}"))]
    BitAccess { reason: &'static str },

    /// Index expression outside the affine grammar.
    #[snafu(display("index is not affine: {reason}"))]
    NonAffineIndex { reason: String },

    #[snafu(display("reduction accumulates {expected} but the body produces {actual}"))]
    ReductionTypeMismatch { expected: DType, actual: DType },

    /// Insertion point requested with none active.
    #[snafu(display("no active insertion point"))]
    EmptyStack,

    #[snafu(display("select branches differ: {then_dtype} vs {else_dtype}"))]
    SelectTypeMismatch { then_dtype: DType, else_dtype: DType },

    #[snafu(display("select condition must be int1, got {dtype}"))]
    SelectConditionNotBool { dtype: DType },

    /// Induction variable used outside of any loop binding it.
    #[snafu(display("induction variable {name:?} is not bound to a loop"))]
    UnboundInductionVariable { name: String },

    /// Tensor used before being allocated or bound to a function argument.
    #[snafu(display("tensor {name:?} has no storage"))]
    UnboundTensor { name: String },

    /// Reduction axis without loop bounds.
    #[snafu(display("reduction axis {name:?} has no bounds"))]
    MissingAxisBounds { name: String },

    /// Statement used where a value is needed.
    #[snafu(display("{node} produces no value"))]
    NoResultValue { node: &'static str },

    /// Scalar accessor on a tensor with more than one element.
    #[snafu(display("tensor {tensor:?} of shape {shape:?} is not a scalar"))]
    ScalarAccess { tensor: String, shape: Vec<usize> },
}

impl From<kiln_dtype::Error> for Error {
    fn from(source: kiln_dtype::Error) -> Self {
        Self::DTypeSpec { source }
    }
}
