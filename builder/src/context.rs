//! Builder context: the module under construction, the build mode, the
//! insertion-point stack and the log of nodes bound inside open regions.

use bon::bon;
use kiln_dtype::DType;
use kiln_ir::{InsertionPoint, Module, OpId, OperationState, Value};
use snafu::OptionExt;

use crate::config::BuildMode;
use crate::error::*;
use crate::expr::{Binding, CallArg, Expr, ExprKind, ExprNode};
use crate::insertion::InsertionStack;

/// Owns everything that changes while expressions are built.
///
/// A fresh context starts with the module body as its only insertion point.
#[derive(Debug)]
pub struct BuilderContext {
    module: Module,
    mode: BuildMode,
    stack: InsertionStack,
    /// Nodes bound while a region was open, innermost last.
    bindings: Vec<Expr>,
    regions: usize,
}

impl Default for BuilderContext {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[bon]
impl BuilderContext {
    #[builder]
    pub fn new(#[builder(default = BuildMode::from_env())] mode: BuildMode, #[builder(default)] module: Module) -> Self {
        let mut stack = InsertionStack::new();
        stack.save(InsertionPoint::at_end(module.body()));
        Self { module, mode, stack, bindings: Vec::new(), regions: 0 }
    }
}

impl BuilderContext {
    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn into_module(self) -> Module {
        self.module
    }

    pub fn stack(&self) -> &InsertionStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut InsertionStack {
        &mut self.stack
    }

    pub fn insertion_point(&self) -> Result<InsertionPoint> {
        self.stack.get()
    }

    /// Run `f`, then drop whatever it left on the insertion stack, on success
    /// and on error alike.
    pub fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let depth = self.stack.depth();
        let result = f(self);
        self.stack.truncate(depth);
        result
    }

    /// Run `f` with `ip` as the current insertion point.
    pub fn with_insertion_point<T>(
        &mut self,
        ip: InsertionPoint,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.scoped(|ctx| {
            ctx.stack.save(ip);
            f(ctx)
        })
    }

    /// Run `f` as the body of a region: every node bound while it runs is
    /// unbound again when it returns, on success and on error alike. Values
    /// defined in a region do not dominate anything after it.
    pub(crate) fn local_bindings<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let mark = self.bindings.len();
        self.regions += 1;
        let result = f(self);
        self.regions -= 1;
        for expr in self.bindings.drain(mark..) {
            expr.unbind();
        }
        result
    }

    /// [`Self::with_insertion_point`] with bindings local to the region.
    pub(crate) fn in_region<T>(&mut self, ip: InsertionPoint, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.local_bindings(|ctx| ctx.with_insertion_point(ip, f))
    }

    /// Record IR for `expr`. Outside any region the binding is permanent.
    pub(crate) fn bind_node(&mut self, expr: &Expr, binding: Binding) {
        expr.bind(binding);
        if self.regions > 0 {
            self.bindings.push(expr.clone());
        }
    }

    /// Create an operation at the current insertion point.
    pub(crate) fn create(&mut self, state: OperationState) -> Result<OpId> {
        let ip = self.stack.get()?;
        Ok(self.module.create(state, ip))
    }

    /// Create an operation and return its first result.
    pub(crate) fn create_value(&mut self, state: OperationState) -> Result<Value> {
        let kind: &'static str = state.kind.into();
        let op = self.create(state)?;
        self.module.result(op).context(NoResultValueSnafu { node: kind })
    }

    /// Wrap a new node, materializing it right away in [`BuildMode::InPlace`]
    /// when everything it depends on already has IR.
    pub(crate) fn finish(&mut self, kind: ExprKind, dtype: Option<DType>) -> Result<Expr> {
        let expr = ExprNode::new(kind, dtype);
        if self.mode.is_in_place() && is_ready(&expr) {
            self.build(&expr)?;
        }
        Ok(expr)
    }
}

/// Whether a node can be materialized now: no reduction inside, and every
/// induction variable and tensor it reaches is bound.
fn is_ready(expr: &Expr) -> bool {
    if expr.is_built() {
        return true;
    }
    let tensors_bound = match expr.kind() {
        ExprKind::Reduce { .. } | ExprKind::InductionVar { .. } => return false,
        ExprKind::Load { tensor, .. } | ExprKind::Store { tensor, .. } => tensor.is_bound(),
        ExprKind::Call { args, .. } => args.iter().all(|arg| match arg {
            CallArg::Tensor(tensor) => tensor.is_bound(),
            CallArg::Expr(_) => true,
        }),
        _ => true,
    };
    tensors_bound && expr.operands().iter().all(is_ready)
}
