//! Arena-backed IR module.
//!
//! Operations and blocks live in flat vectors and refer to each other by id.
//! Every region holds exactly one block, which is all the affine and func
//! constructs need.

use smallvec::SmallVec;

use crate::op::OpKind;
use crate::types::{Attribute, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("op{_0}")]
pub struct OpId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("^bb{_0}")]
pub struct BlockId(u32);

/// SSA value: an operation result or a block argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Value {
    #[display("{op}#{index}")]
    Result { op: OpId, index: u32 },
    #[display("{block}#{index}")]
    Arg { block: BlockId, index: u32 },
}

impl OpId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl BlockId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where the next created operation goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionPoint {
    pub block: BlockId,
    /// Insert before this operation instead of appending.
    pub before: Option<OpId>,
}

impl InsertionPoint {
    pub fn at_end(block: BlockId) -> Self {
        Self { block, before: None }
    }

    pub fn before(block: BlockId, op: OpId) -> Self {
        Self { block, before: Some(op) }
    }
}

#[derive(Debug, Clone)]
pub struct Operation {
    pub kind: OpKind,
    pub operands: SmallVec<[Value; 4]>,
    pub results: SmallVec<[Type; 1]>,
    pub attributes: SmallVec<[(&'static str, Attribute); 4]>,
    pub regions: SmallVec<[BlockId; 1]>,
    pub parent: BlockId,
}

impl Operation {
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|(key, _)| *key == name).map(|(_, attr)| attr)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub args: SmallVec<[Type; 2]>,
    pub ops: Vec<OpId>,
    /// Operation owning the region, `None` for the module body.
    pub parent: Option<OpId>,
}

/// Everything needed to create one operation.
#[derive(Debug, Clone)]
pub struct OperationState {
    pub kind: OpKind,
    pub operands: SmallVec<[Value; 4]>,
    pub results: SmallVec<[Type; 1]>,
    pub attributes: SmallVec<[(&'static str, Attribute); 4]>,
    /// Block argument types of each region to create.
    pub regions: SmallVec<[SmallVec<[Type; 2]>; 1]>,
}

impl OperationState {
    pub fn new(kind: OpKind) -> Self {
        Self {
            kind,
            operands: SmallVec::new(),
            results: SmallVec::new(),
            attributes: SmallVec::new(),
            regions: SmallVec::new(),
        }
    }

    pub fn operands(mut self, operands: impl IntoIterator<Item = Value>) -> Self {
        self.operands.extend(operands);
        self
    }

    pub fn result(mut self, ty: impl Into<Type>) -> Self {
        self.results.push(ty.into());
        self
    }

    pub fn attr(mut self, name: &'static str, attr: Attribute) -> Self {
        self.attributes.push((name, attr));
        self
    }

    pub fn region(mut self, args: impl IntoIterator<Item = Type>) -> Self {
        self.regions.push(args.into_iter().collect());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Module {
    ops: Vec<Operation>,
    blocks: Vec<Block>,
    body: BlockId,
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}

impl Module {
    pub fn new() -> Self {
        Self { ops: Vec::new(), blocks: vec![Block::default()], body: BlockId(0) }
    }

    /// Top-level block holding functions and free-standing operations.
    pub fn body(&self) -> BlockId {
        self.body
    }

    /// Create an operation at `ip`, together with its regions.
    pub fn create(&mut self, state: OperationState, ip: InsertionPoint) -> OpId {
        let id = OpId(self.ops.len() as u32);
        let regions = state
            .regions
            .into_iter()
            .map(|args| {
                let block = BlockId(self.blocks.len() as u32);
                self.blocks.push(Block { args, ops: Vec::new(), parent: Some(id) });
                block
            })
            .collect();

        tracing::trace!(op = %id, kind = %state.kind, block = %ip.block, "create operation");
        self.ops.push(Operation {
            kind: state.kind,
            operands: state.operands,
            results: state.results,
            attributes: state.attributes,
            regions,
            parent: ip.block,
        });

        let ops = &mut self.blocks[ip.block.index()].ops;
        match ip.before.and_then(|before| ops.iter().position(|&op| op == before)) {
            Some(position) => ops.insert(position, id),
            None => ops.push(id),
        }
        id
    }

    pub fn op(&self, id: OpId) -> &Operation {
        &self.ops[id.index()]
    }

    pub fn op_mut(&mut self, id: OpId) -> &mut Operation {
        &mut self.ops[id.index()]
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    /// Number of operations ever created.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// First result of an operation.
    pub fn result(&self, id: OpId) -> Option<Value> {
        (!self.op(id).results.is_empty()).then_some(Value::Result { op: id, index: 0 })
    }

    pub fn block_arg(&self, block: BlockId, index: usize) -> Option<Value> {
        (index < self.block(block).args.len()).then_some(Value::Arg { block, index: index as u32 })
    }

    /// Single block of the `index`th region of `op`.
    pub fn region(&self, op: OpId, index: usize) -> Option<BlockId> {
        self.op(op).regions.get(index).copied()
    }

    pub fn value_type(&self, value: Value) -> &Type {
        match value {
            Value::Result { op, index } => &self.op(op).results[index as usize],
            Value::Arg { block, index } => &self.block(block).args[index as usize],
        }
    }

    /// Operations of a kind, in creation order.
    pub fn ops_of_kind(&self, kind: OpKind) -> impl Iterator<Item = OpId> + '_ {
        self.ops.iter().enumerate().filter(move |(_, op)| op.kind == kind).map(|(i, _)| OpId(i as u32))
    }

    /// Count of operations of a kind.
    pub fn count(&self, kind: OpKind) -> usize {
        self.ops_of_kind(kind).count()
    }

    /// `func.func` with the given symbol name.
    pub fn function(&self, name: &str) -> Option<OpId> {
        self.ops_of_kind(OpKind::Func)
            .find(|&id| self.op(id).attr("sym_name").and_then(Attribute::as_str) == Some(name))
    }

    /// Operation whose region contains `block`, walking up through nested blocks.
    pub fn enclosing(&self, block: BlockId, kind: OpKind) -> Option<OpId> {
        let mut current = self.block(block).parent;
        while let Some(op) = current {
            if self.op(op).kind == kind {
                return Some(op);
            }
            current = self.block(self.op(op).parent).parent;
        }
        None
    }
}
