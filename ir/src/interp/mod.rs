//! Reference interpreter.
//!
//! Executes a function of a [`Module`] over host buffers, walking blocks and
//! keeping one value scope per block being executed, so a value is only
//! visible in the block that defines it and in blocks nested inside it. Buffers are shared by id, so a
//! buffer passed to a callee is updated in place.

mod value;

use std::collections::HashMap;

use kiln_dtype::DType;
use smallvec::SmallVec;
use snafu::{OptionExt, ensure};

use crate::error::*;
use crate::module::{BlockId, Module, OpId, Value};
use crate::op::{CmpFPredicate, CmpIPredicate, OpKind};
use crate::types::Attribute;

pub use value::{Buffer, Scalar, convert, normalize, round_float, signed, unsigned};

#[derive(Debug, Clone, Copy, PartialEq)]
enum RtValue {
    Scalar(Scalar),
    Buffer(usize),
}

/// Values of one call, one scope per block being executed, innermost last.
#[derive(Debug, Default)]
struct Frame {
    scopes: Vec<HashMap<Value, RtValue>>,
}

impl Frame {
    fn get(&self, value: &Value) -> Option<RtValue> {
        self.scopes.iter().rev().find_map(|scope| scope.get(value).copied())
    }

    fn insert(&mut self, value: Value, rt: RtValue) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(value, rt);
        }
    }
}

/// Run `name` with `args` bound to its (buffer) parameters.
///
/// Buffers are written back into `args`; scalar results of `func.return` are returned.
pub fn call(module: &Module, name: &str, args: &mut [Buffer]) -> Result<Vec<Scalar>> {
    Interpreter::new(module).call(name, args)
}

pub struct Interpreter<'m> {
    module: &'m Module,
    heap: Vec<Buffer>,
}

impl<'m> Interpreter<'m> {
    pub fn new(module: &'m Module) -> Self {
        Self { module, heap: Vec::new() }
    }

    pub fn call(&mut self, name: &str, args: &mut [Buffer]) -> Result<Vec<Scalar>> {
        let func = self.module.function(name).context(UnknownFunctionSnafu { name })?;

        let base = self.heap.len();
        self.heap.extend(args.iter().cloned());
        let handles = (base..base + args.len()).map(RtValue::Buffer).collect();

        let results = self.run_function(func, name, handles)?;
        for (i, arg) in args.iter_mut().enumerate() {
            *arg = self.heap[base + i].clone();
        }

        results
            .into_iter()
            .map(|value| match value {
                RtValue::Scalar(s) => Ok(s),
                RtValue::Buffer(_) => OperandKindSnafu { op: func, kind: OpKind::Return, expected: "scalar" }.fail(),
            })
            .collect()
    }

    fn run_function(&mut self, func: OpId, name: &str, args: Vec<RtValue>) -> Result<Vec<RtValue>> {
        let body = self.module.region(func, 0).context(UnknownFunctionSnafu { name })?;
        let expected = self.module.block(body).args.len();
        ensure!(args.len() == expected, ArgumentMismatchSnafu { name, expected, actual: args.len() });

        tracing::debug!(function = name, args = args.len(), "interpret");
        let mut frame = Frame::default();
        Ok(self.run_block(body, &mut frame, args)?.unwrap_or_default())
    }

    /// Execute a block in a scope of its own, with `args` bound to its
    /// arguments; `Some` when it ended in `func.return`.
    fn run_block(
        &mut self,
        block: BlockId,
        frame: &mut Frame,
        args: impl IntoIterator<Item = RtValue>,
    ) -> Result<Option<Vec<RtValue>>> {
        let scope = args.into_iter().enumerate().map(|(i, arg)| (Value::Arg { block, index: i as u32 }, arg));
        frame.scopes.push(scope.collect());
        let result = self.run_ops(block, frame);
        frame.scopes.pop();
        result
    }

    fn run_ops(&mut self, block: BlockId, frame: &mut Frame) -> Result<Option<Vec<RtValue>>> {
        let module = self.module;
        for &op in &module.block(block).ops {
            if let Some(returned) = self.run_op(op, frame)? {
                return Ok(Some(returned));
            }
        }
        Ok(None)
    }

    fn get(&self, frame: &Frame, value: Value) -> Result<RtValue> {
        frame.get(&value).context(UndefinedValueSnafu { value })
    }

    fn scalar(&self, frame: &Frame, id: OpId, value: Value) -> Result<Scalar> {
        match self.get(frame, value)? {
            RtValue::Scalar(s) => Ok(s),
            RtValue::Buffer(_) => {
                OperandKindSnafu { op: id, kind: self.module.op(id).kind, expected: "scalar" }.fail()
            }
        }
    }

    fn int(&self, frame: &Frame, id: OpId, value: Value) -> Result<i128> {
        match self.scalar(frame, id, value)? {
            Scalar::Int(v) => Ok(v),
            Scalar::Float(_) => {
                OperandKindSnafu { op: id, kind: self.module.op(id).kind, expected: "integer" }.fail()
            }
        }
    }

    fn float(&self, frame: &Frame, id: OpId, value: Value) -> Result<f64> {
        match self.scalar(frame, id, value)? {
            Scalar::Float(x) => Ok(x),
            Scalar::Int(_) => OperandKindSnafu { op: id, kind: self.module.op(id).kind, expected: "float" }.fail(),
        }
    }

    fn buffer(&self, frame: &Frame, id: OpId, value: Value) -> Result<usize> {
        match self.get(frame, value)? {
            RtValue::Buffer(b) => Ok(b),
            RtValue::Scalar(_) => {
                OperandKindSnafu { op: id, kind: self.module.op(id).kind, expected: "buffer" }.fail()
            }
        }
    }

    fn attr(&self, id: OpId, name: &'static str) -> Result<&'m Attribute> {
        let module = self.module;
        let op = module.op(id);
        op.attr(name).context(MissingAttributeSnafu { op: id, kind: op.kind, name })
    }

    fn map_operands(&self, frame: &Frame, id: OpId, operands: &[Value]) -> Result<SmallVec<[i64; 4]>> {
        operands.iter().map(|&v| self.int(frame, id, v).map(|i| i as i64)).collect()
    }

    fn access(&self, frame: &Frame, id: OpId, operands: &[Value]) -> Result<SmallVec<[i64; 4]>> {
        let map = self.attr(id, "map")?.as_affine_map().context(MissingAttributeSnafu {
            op: id,
            kind: self.module.op(id).kind,
            name: "map",
        })?;
        let dims = self.map_operands(frame, id, operands)?;
        let (dims, symbols) = dims.split_at(map.dims.min(dims.len()));
        map.eval(dims, symbols).context(DivisionByZeroSnafu { op: id, kind: self.module.op(id).kind })
    }

    fn run_op(&mut self, id: OpId, frame: &mut Frame) -> Result<Option<Vec<RtValue>>> {
        let module = self.module;
        let op = module.op(id);
        let result_dtype = op.results.first().map(|ty| ty.dtype());
        let operand_dtype = |i: usize| module.value_type(op.operands[i]).dtype();

        let result = match op.kind {
            OpKind::Func | OpKind::AffineYield => None,
            OpKind::Return => {
                let values = op.operands.iter().map(|&v| self.get(frame, v)).collect::<Result<_>>()?;
                return Ok(Some(values));
            }

            OpKind::Constant => {
                let dtype = result_dtype.unwrap_or(DType::int64());
                Some(RtValue::Scalar(match self.attr(id, "value")? {
                    Attribute::Int { value, ty } => convert(Scalar::Int(normalize(*value as i128, *ty)), *ty, dtype),
                    Attribute::Float { value, .. } => convert(Scalar::Float(*value), DType::Float64, dtype),
                    _ => return MissingAttributeSnafu { op: id, kind: op.kind, name: "value" }.fail(),
                }))
            }

            OpKind::Alloc => {
                let ty = &op.results[0];
                let shape = ty.shape().map(<[usize]>::to_vec).unwrap_or_default();
                self.heap.push(Buffer::zeros(shape, ty.dtype()));
                Some(RtValue::Buffer(self.heap.len() - 1))
            }

            OpKind::AffineLoad => {
                let buffer = self.buffer(frame, id, op.operands[0])?;
                let indices = self.access(frame, id, &op.operands[1..])?;
                let buffer = &self.heap[buffer];
                let value = buffer.get(&indices).context(OutOfBoundsSnafu {
                    indices: indices.to_vec(),
                    shape: buffer.shape.to_vec(),
                })?;
                Some(RtValue::Scalar(value))
            }

            OpKind::AffineStore => {
                let value = self.scalar(frame, id, op.operands[0])?;
                let buffer = self.buffer(frame, id, op.operands[1])?;
                let indices = self.access(frame, id, &op.operands[2..])?;
                let buffer = &mut self.heap[buffer];
                ensure!(
                    buffer.set(&indices, value),
                    OutOfBoundsSnafu { indices: indices.to_vec(), shape: buffer.shape.to_vec() }
                );
                None
            }

            OpKind::AffineFor => {
                self.run_for(id, frame)?;
                None
            }

            OpKind::AffineIf => {
                let set = self.attr(id, "condition")?.as_integer_set().context(MissingAttributeSnafu {
                    op: id,
                    kind: op.kind,
                    name: "condition",
                })?;
                let operands = self.map_operands(frame, id, &op.operands)?;
                let (dims, symbols) = operands.split_at(set.dims.min(operands.len()));
                let taken = set.contains(dims, symbols).context(DivisionByZeroSnafu { op: id, kind: op.kind })?;
                let region = if taken { op.regions.first() } else { op.regions.get(1) };
                if let Some(&block) = region
                    && let Some(returned) = self.run_block(block, frame, [])?
                {
                    return Ok(Some(returned));
                }
                None
            }

            OpKind::Call => {
                let callee = self.attr(id, "callee")?.as_str().unwrap_or_default();
                let func = module.function(callee).context(UnknownFunctionSnafu { name: callee })?;
                let args = op.operands.iter().map(|&v| self.get(frame, v)).collect::<Result<_>>()?;
                let returned = self.run_function(func, callee, args)?;
                for (i, value) in returned.into_iter().enumerate().take(op.results.len()) {
                    frame.insert(Value::Result { op: id, index: i as u32 }, value);
                }
                return Ok(None);
            }

            OpKind::IndexCast | OpKind::UnrealizedCast => {
                let source = self.scalar(frame, id, op.operands[0])?;
                let to = result_dtype.unwrap_or(DType::Index);
                Some(RtValue::Scalar(convert(source, operand_dtype(0), to)))
            }

            OpKind::Select => {
                let cond = self.int(frame, id, op.operands[0])?;
                let chosen = if cond != 0 { op.operands[1] } else { op.operands[2] };
                Some(RtValue::Scalar(self.scalar(frame, id, chosen)?))
            }

            OpKind::GetBit => {
                let value = self.int(frame, id, op.operands[0])?;
                let bit = self.int(frame, id, op.operands[1])?;
                let width = operand_dtype(0).width();
                let set = (0..width as i128).contains(&bit) && (unsigned(value, width) >> bit) & 1 == 1;
                Some(RtValue::Scalar(Scalar::Int(set as i128)))
            }

            OpKind::CmpI | OpKind::CmpFixed => {
                let code = self.attr(id, "predicate")?.as_int().unwrap_or(-1);
                let predicate = CmpIPredicate::from_repr(code)
                    .context(MissingAttributeSnafu { op: id, kind: op.kind, name: "predicate" })?;
                let width = operand_dtype(0).width();
                let (lhs, rhs) = (self.int(frame, id, op.operands[0])?, self.int(frame, id, op.operands[1])?);
                let holds = match predicate {
                    CmpIPredicate::Ult | CmpIPredicate::Ule | CmpIPredicate::Ugt | CmpIPredicate::Uge => {
                        predicate.eval(unsigned(lhs, width), unsigned(rhs, width))
                    }
                    _ => predicate.eval(signed(lhs, width), signed(rhs, width)),
                };
                Some(RtValue::Scalar(Scalar::Int(holds as i128)))
            }

            OpKind::CmpF => {
                let code = self.attr(id, "predicate")?.as_int().unwrap_or(-1);
                let predicate = CmpFPredicate::from_repr(code)
                    .context(MissingAttributeSnafu { op: id, kind: op.kind, name: "predicate" })?;
                let (lhs, rhs) = (self.float(frame, id, op.operands[0])?, self.float(frame, id, op.operands[1])?);
                Some(RtValue::Scalar(Scalar::Int(predicate.eval(lhs, rhs) as i128)))
            }

            kind => {
                let dtype = result_dtype.unwrap_or(DType::int64());
                let value = match op.operands.as_slice() {
                    [x] => self.unary(id, kind, dtype, self.scalar(frame, id, *x)?)?,
                    [a, b] => self.binary(id, kind, dtype, self.scalar(frame, id, *a)?, self.scalar(frame, id, *b)?)?,
                    _ => return UnsupportedOperationSnafu { kind, dtype }.fail(),
                };
                Some(RtValue::Scalar(value))
            }
        };

        if let Some(value) = result {
            frame.insert(Value::Result { op: id, index: 0 }, value);
        }
        Ok(None)
    }

    fn run_for(&mut self, id: OpId, frame: &mut Frame) -> Result<()> {
        let module = self.module;
        let op = module.op(id);
        let missing = |name| MissingAttributeSnafu { op: id, kind: op.kind, name };

        let lower = self.attr(id, "lower_bound")?.as_affine_map().context(missing("lower_bound"))?;
        let upper = self.attr(id, "upper_bound")?.as_affine_map().context(missing("upper_bound"))?;
        let step = self.attr(id, "step")?.as_int().context(missing("step"))?.max(1);

        let split = (lower.dims + lower.symbols).min(op.operands.len());
        let (lower_operands, upper_operands) = op.operands.split_at(split);
        let lower_operands = self.map_operands(frame, id, lower_operands)?;
        let upper_operands = self.map_operands(frame, id, upper_operands)?;

        let (dims, symbols) = lower_operands.split_at(lower.dims.min(lower_operands.len()));
        let lb = lower.eval(dims, symbols).context(DivisionByZeroSnafu { op: id, kind: op.kind })?;
        let (dims, symbols) = upper_operands.split_at(upper.dims.min(upper_operands.len()));
        let ub = upper.eval(dims, symbols).context(DivisionByZeroSnafu { op: id, kind: op.kind })?;
        let (lb, ub) = (lb.iter().copied().max().unwrap_or(0), ub.iter().copied().min().unwrap_or(0));

        let body = op.regions[0];
        let mut i = lb;
        while i < ub {
            self.run_block(body, frame, [RtValue::Scalar(Scalar::Int(i as i128))])?;
            i += step;
        }
        Ok(())
    }

    fn unary(&self, id: OpId, kind: OpKind, dtype: DType, x: Scalar) -> Result<Scalar> {
        let Scalar::Float(x) = x else {
            return UnsupportedOperationSnafu { kind, dtype }.fail();
        };
        let y = match kind {
            OpKind::NegF => -x,
            OpKind::Exp => x.exp(),
            OpKind::Log => x.ln(),
            OpKind::Log2 => x.log2(),
            OpKind::Log10 => x.log10(),
            OpKind::Sqrt => x.sqrt(),
            OpKind::Sin => x.sin(),
            OpKind::Cos => x.cos(),
            OpKind::Tanh => x.tanh(),
            OpKind::Floor => x.floor(),
            _ => return UnsupportedOperationSnafu { kind, dtype }.fail(),
        };
        tracing::trace!(op = %id, %kind, x, y, "unary");
        Ok(Scalar::Float(round_float(y, dtype)))
    }

    fn binary(&self, id: OpId, kind: OpKind, dtype: DType, a: Scalar, b: Scalar) -> Result<Scalar> {
        match (a, b) {
            (Scalar::Float(a), Scalar::Float(b)) => {
                let y = match kind {
                    OpKind::AddF => a + b,
                    OpKind::SubF => a - b,
                    OpKind::MulF => a * b,
                    OpKind::DivF => a / b,
                    OpKind::RemF => a % b,
                    OpKind::MinF if a.is_nan() || b.is_nan() => f64::NAN,
                    OpKind::MaxF if a.is_nan() || b.is_nan() => f64::NAN,
                    OpKind::MinF => a.min(b),
                    OpKind::MaxF => a.max(b),
                    _ => return UnsupportedOperationSnafu { kind, dtype }.fail(),
                };
                Ok(Scalar::Float(round_float(y, dtype)))
            }
            (Scalar::Int(a), Scalar::Int(b)) => {
                let y = self.int_binary(id, kind, dtype, a, b)?;
                Ok(Scalar::Int(normalize(y, dtype)))
            }
            _ => UnsupportedOperationSnafu { kind, dtype }.fail(),
        }
    }

    fn int_binary(&self, id: OpId, kind: OpKind, dtype: DType, a: i128, b: i128) -> Result<i128> {
        let width = dtype.width();
        let frac = dtype.frac().unwrap_or(0);
        let (sa, sb) = (signed(a, width), signed(b, width));
        let (ua, ub) = (unsigned(a, width), unsigned(b, width));
        let nonzero = |d: i128| -> Result<i128> {
            ensure!(d != 0, DivisionByZeroSnafu { op: id, kind });
            Ok(d)
        };
        let shift = |amount: i128| u32::try_from(amount).ok().filter(|&s| s < width);

        Ok(match kind {
            OpKind::AddI | OpKind::AddFixed => a.wrapping_add(b),
            OpKind::SubI | OpKind::SubFixed => a.wrapping_sub(b),
            OpKind::MulI => a.wrapping_mul(b),
            OpKind::MulFixed => a.wrapping_mul(b) >> frac,
            OpKind::DivFixed => (a << frac) / nonzero(b)?,
            OpKind::DivSI => sa / nonzero(sb)?,
            OpKind::DivUI => ua / nonzero(ub)?,
            OpKind::FloorDivSI => sa.div_euclid(nonzero(sb)?) - i128::from(sb < 0 && sa.rem_euclid(sb) != 0),
            OpKind::RemSI => sa % nonzero(sb)?,
            OpKind::RemUI => ua % nonzero(ub)?,
            OpKind::MinSI => sa.min(sb),
            OpKind::MaxSI => sa.max(sb),
            OpKind::MinUI => ua.min(ub),
            OpKind::MaxUI => ua.max(ub),
            OpKind::MinFixed => a.min(b),
            OpKind::MaxFixed => a.max(b),
            OpKind::AndI => a & b,
            OpKind::OrI => a | b,
            OpKind::XOrI => a ^ b,
            OpKind::ShLI => shift(b).map_or(0, |s| a << s),
            OpKind::ShRSI => shift(b).map_or(if sa < 0 { -1 } else { 0 }, |s| sa >> s),
            OpKind::ShRUI => shift(b).map_or(0, |s| ua >> s),
            _ => return UnsupportedOperationSnafu { kind, dtype }.fail(),
        })
    }
}
