//! Loop-nest queries used by schedule transformations.

use crate::module::{BlockId, Module, OpId};
use crate::op::OpKind;
use crate::types::Attribute;

/// One loop of a band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopInfo {
    pub op: OpId,
    pub name: Option<String>,
}

/// Perfectly nested `affine.for` operations, outermost first.
pub type LoopBand = Vec<LoopInfo>;

impl Module {
    /// Loop bands of a function: one band per outermost `affine.for` of its body.
    ///
    /// A band continues into a loop body as long as the body holds a single
    /// `affine.for` and nothing else but the terminator.
    pub fn loop_nests(&self, func: OpId) -> Vec<LoopBand> {
        let Some(body) = self.region(func, 0) else {
            return Vec::new();
        };

        self.block(body)
            .ops
            .iter()
            .filter(|&&op| self.op(op).kind == OpKind::AffineFor)
            .map(|&outer| {
                let mut band = vec![self.loop_info(outer)];
                let mut current = outer;
                while let Some(inner) = self.region(current, 0).and_then(|block| self.sole_loop(block)) {
                    band.push(self.loop_info(inner));
                    current = inner;
                }
                band
            })
            .collect()
    }

    fn loop_info(&self, op: OpId) -> LoopInfo {
        let name = self.op(op).attr("loop_name").and_then(Attribute::as_str).map(str::to_string);
        LoopInfo { op, name }
    }

    fn sole_loop(&self, block: BlockId) -> Option<OpId> {
        let mut body = self.block(block).ops.iter().filter(|&&op| !self.op(op).kind.is_terminator());
        match (body.next(), body.next()) {
            (Some(&op), None) if self.op(op).kind == OpKind::AffineFor => Some(op),
            _ => None,
        }
    }
}
