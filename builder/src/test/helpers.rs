//! Shared setup for builder tests.

use kiln_ir::interp::{self, Buffer};
use kiln_ir::Module;

use crate::{BuildMode, BuilderContext, Expr, IndexArg};

/// Context with an explicit mode, independent of `KILN_BUILD_INPLACE`.
pub fn context(mode: BuildMode) -> BuilderContext {
    BuilderContext::builder().mode(mode).build()
}

pub fn deferred() -> BuilderContext {
    context(BuildMode::Deferred)
}

pub fn in_place() -> BuilderContext {
    context(BuildMode::InPlace)
}

pub fn at(expr: &Expr) -> IndexArg {
    IndexArg::from(expr)
}

/// Run `name` and return the buffers after the call.
#[track_caller]
pub fn run(module: &Module, name: &str, mut args: Vec<Buffer>) -> Vec<Buffer> {
    interp::call(module, name, &mut args).unwrap_or_else(|e| panic!("interpreting {name} failed: {e}\n{module}"));
    args
}
