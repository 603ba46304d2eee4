use kiln_dtype::DType;
use snafu::Snafu;

use crate::module::{OpId, Value};
use crate::op::OpKind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// `func.call` or entry point naming a function the module does not define.
    #[snafu(display("unknown function @{name}"))]
    UnknownFunction { name: String },

    /// Operation the interpreter cannot execute with the given operand types.
    #[snafu(display("unsupported operation {kind} on {dtype}"))]
    UnsupportedOperation { kind: OpKind, dtype: DType },

    /// Operation lacks an attribute its semantics depend on.
    #[snafu(display("{op} ({kind}) is missing attribute {name:?}"))]
    MissingAttribute { op: OpId, kind: OpKind, name: &'static str },

    /// Buffer access outside the buffer shape.
    #[snafu(display("index {indices:?} is out of bounds for shape {shape:?}"))]
    OutOfBounds { indices: Vec<i64>, shape: Vec<usize> },

    /// Function invoked with the wrong number or kind of arguments.
    #[snafu(display("@{name} expects {expected} arguments, got {actual}"))]
    ArgumentMismatch { name: String, expected: usize, actual: usize },

    /// Integer or fixed point division by zero.
    #[snafu(display("{op} ({kind}) divides by zero"))]
    DivisionByZero { op: OpId, kind: OpKind },

    /// Value used before any operation defined it.
    #[snafu(display("value {value} used before definition"))]
    UndefinedValue { value: Value },

    /// Operand of the wrong kind (a buffer where a scalar is expected, or the reverse).
    #[snafu(display("{op} ({kind}) expected a {expected} operand"))]
    OperandKind { op: OpId, kind: OpKind, expected: &'static str },
}
