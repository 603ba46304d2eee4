//! ASCII rendering of expression trees.

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashSet;
use std::io;
use std::rc::Rc;

use ptree::{Style, TreeItem};

use super::{Bound, CallArg, Expr, ExprKind};

/// Renders each shared node once; later occurrences print `[id] → (see above)`.
#[derive(Clone)]
struct ExprTree {
    expr: Expr,
    visited: Rc<RefCell<HashSet<u64>>>,
    is_backref: RefCell<bool>,
}

impl ExprTree {
    fn child(expr: Expr, visited: Rc<RefCell<HashSet<u64>>>) -> Self {
        Self { expr, visited, is_backref: RefCell::new(false) }
    }
}

impl TreeItem for ExprTree {
    type Child = ExprTree;

    fn write_self<W: io::Write>(&self, f: &mut W, _style: &Style) -> io::Result<()> {
        let mut visited = self.visited.borrow_mut();
        if visited.insert(self.expr.id()) {
            write!(f, "{}", format_node(&self.expr))
        } else {
            *self.is_backref.borrow_mut() = true;
            write!(f, "[{}] → (see above)", self.expr.id())
        }
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        if *self.is_backref.borrow() {
            return Cow::Borrowed(&[]);
        }
        let children =
            self.expr.operands().into_iter().map(|expr| ExprTree::child(expr, self.visited.clone())).collect();
        Cow::Owned(children)
    }
}

fn format_bound(bound: &Bound) -> String {
    match bound {
        Bound::Const(value) => value.to_string(),
        Bound::Expr(expr) => format!("[{}]", expr.id()),
    }
}

/// `[id] KIND : dtype`
fn format_node(expr: &Expr) -> String {
    let kind = match expr.kind() {
        ExprKind::Constant(literal) => format!("CONST({literal})"),
        ExprKind::InductionVar { name, bounds: Some((lower, upper)) } => {
            format!("IV('{name}', {}..{})", format_bound(lower), format_bound(upper))
        }
        ExprKind::InductionVar { name, bounds: None } => format!("IV('{name}')"),
        ExprKind::Unary { op, .. } => op.to_string().to_uppercase(),
        ExprKind::Binary { op, .. } => op.to_string().to_uppercase(),
        ExprKind::Compare { predicate, .. } => format!("CMP({predicate})"),
        ExprKind::Cast { .. } => "CAST".to_string(),
        ExprKind::Load { tensor, .. } => format!("LOAD({})", tensor.name()),
        ExprKind::Store { tensor, .. } => format!("STORE({})", tensor.name()),
        ExprKind::Select { .. } => "SELECT".to_string(),
        ExprKind::Call { callee, args } => {
            let tensors: Vec<_> = args
                .iter()
                .filter_map(|arg| match arg {
                    CallArg::Tensor(tensor) => Some(tensor.name()),
                    CallArg::Expr(_) => None,
                })
                .collect();
            format!("CALL(@{callee}, tensors={tensors:?})")
        }
        ExprKind::GetBit { .. } => "GET_BIT".to_string(),
        ExprKind::Reduce { op, axes, .. } => {
            let axes: Vec<_> = axes.iter().filter_map(|axis| axis.iv_name()).collect();
            format!("REDUCE({op}, axes={axes:?})")
        }
    };

    match expr.dtype() {
        Some(dtype) => format!("[{}] {kind} : {dtype}", expr.id()),
        None => format!("[{}] {kind}", expr.id()),
    }
}

/// Render an expression as an ASCII tree.
pub fn render_tree(expr: &Expr) -> io::Result<String> {
    let tree = ExprTree::child(expr.clone(), Rc::new(RefCell::new(HashSet::new())));
    let mut buf = Vec::new();
    ptree::write_tree(&tree, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
