//! Stack of insertion points.
//!
//! The top of the stack is where the next materialized operation goes.
//! Entering a loop or conditional body pushes the body's end; leaving it pops.

use kiln_ir::InsertionPoint;
use snafu::OptionExt;

use crate::error::*;

#[derive(Debug, Clone, Default)]
pub struct InsertionStack {
    points: Vec<InsertionPoint>,
}

impl InsertionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&mut self, point: InsertionPoint) {
        tracing::trace!(block = %point.block, depth = self.points.len() + 1, "save insertion point");
        self.points.push(point);
    }

    /// Current insertion point, without popping.
    pub fn get(&self) -> Result<InsertionPoint> {
        self.points.last().copied().context(EmptyStackSnafu)
    }

    /// Pop and return the current insertion point.
    pub fn restore(&mut self) -> Result<InsertionPoint> {
        let point = self.points.pop().context(EmptyStackSnafu)?;
        tracing::trace!(block = %point.block, depth = self.points.len(), "restore insertion point");
        Ok(point)
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn depth(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Drop every point above `depth`.
    pub fn truncate(&mut self, depth: usize) {
        self.points.truncate(depth);
    }
}
