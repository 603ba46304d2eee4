//! Affine index extraction.
//!
//! Turns the index expressions of one load or store into an [`AffineMap`]
//! over the induction variables they mention. Dimension slots are assigned in
//! first-appearance order and are local to the access.

use kiln_ir::{AffineExpr, AffineMap, Value};
use snafu::{OptionExt, ensure};

use crate::context::BuilderContext;
use crate::error::*;
use crate::expr::{BinaryKind, Expr, ExprKind, Literal};

#[derive(Debug, Default)]
pub struct AffineExtractor {
    operands: Vec<Expr>,
}

impl AffineExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.operands.clear();
    }

    /// Induction variables seen so far; position is the dimension slot.
    pub fn operands(&self) -> &[Expr] {
        &self.operands
    }

    fn slot(&mut self, iv: &Expr) -> usize {
        match self.operands.iter().position(|seen| seen.id() == iv.id()) {
            Some(slot) => slot,
            None => {
                self.operands.push(iv.clone());
                self.operands.len() - 1
            }
        }
    }

    /// Affine form of one index expression.
    pub fn extract(&mut self, expr: &Expr) -> Result<AffineExpr> {
        match expr.kind() {
            ExprKind::InductionVar { .. } => Ok(AffineExpr::dim(self.slot(expr))),
            ExprKind::Constant(Literal::Int(value)) => Ok(AffineExpr::constant(*value)),
            ExprKind::Constant(Literal::Float(value)) => {
                NonAffineIndexSnafu { reason: format!("float constant {value}") }.fail()
            }
            ExprKind::Cast { source } => self.extract(source),
            ExprKind::Binary { op, lhs, rhs } => {
                let (lhs, rhs) = (self.extract(lhs)?, self.extract(rhs)?);
                if matches!(op, BinaryKind::Div | BinaryKind::FloorDiv | BinaryKind::Rem) {
                    ensure!(
                        rhs != AffineExpr::constant(0),
                        NonAffineIndexSnafu { reason: format!("{op} by zero") }
                    );
                }
                let combined = match op {
                    BinaryKind::Add => lhs + rhs,
                    BinaryKind::Sub => lhs - rhs,
                    BinaryKind::Mul => lhs * rhs,
                    BinaryKind::Div | BinaryKind::FloorDiv => lhs.floor_div(rhs),
                    BinaryKind::Rem => lhs.modulo(rhs),
                    other => return NonAffineIndexSnafu { reason: format!("operator {other}") }.fail(),
                };
                ensure!(combined.is_pure_affine(), NonAffineIndexSnafu { reason: format!("{combined}") });
                Ok(combined)
            }
            _ => NonAffineIndexSnafu { reason: format!("{} node", expr.name()) }.fail(),
        }
    }

    /// Map of a whole access. Clears previously collected operands first.
    pub fn extract_map(&mut self, indices: &[Expr]) -> Result<AffineMap> {
        self.clear();
        let results = indices.iter().map(|index| self.extract(index)).collect::<Result<Vec<_>>>()?;
        tracing::trace!(dims = self.operands.len(), indices = indices.len(), "affine access");
        Ok(AffineMap::new(self.operands.len(), 0, results))
    }
}

/// Map and IR operands of one access.
#[derive(Debug, Clone)]
pub(crate) struct Access {
    pub map: AffineMap,
    pub operands: Vec<Value>,
}

impl BuilderContext {
    pub(crate) fn affine_access(&mut self, indices: &[Expr]) -> Result<Access> {
        let mut extractor = AffineExtractor::new();
        let map = extractor.extract_map(indices)?;
        let operands = extractor
            .operands()
            .iter()
            .map(|iv| {
                iv.binding().and_then(|b| b.value()).context(UnboundInductionVariableSnafu {
                    name: iv.iv_name().unwrap_or_default(),
                })
            })
            .collect::<Result<_>>()?;
        Ok(Access { map, operands })
    }
}
