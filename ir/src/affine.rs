//! Affine expressions, maps and integer sets.
//!
//! An affine expression is an integer combination of dimension identifiers
//! `d_i`, symbols `s_i` and constants, with `floordiv`, `ceildiv` and `mod` by
//! a constant. Constructors fold constants and keep constants on the right of
//! commutative operations, so structurally equal formulas compare equal.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum AffineKind {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "mod")]
    Mod,
    #[strum(serialize = "floordiv")]
    FloorDiv,
    #[strum(serialize = "ceildiv")]
    CeilDiv,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AffineExpr {
    Dim(usize),
    Symbol(usize),
    Constant(i64),
    Binary { kind: AffineKind, lhs: Box<AffineExpr>, rhs: Box<AffineExpr> },
}

impl AffineExpr {
    pub fn dim(index: usize) -> Self {
        Self::Dim(index)
    }

    pub fn symbol(index: usize) -> Self {
        Self::Symbol(index)
    }

    pub fn constant(value: i64) -> Self {
        Self::Constant(value)
    }

    pub fn as_constant(&self) -> Option<i64> {
        match self {
            Self::Constant(c) => Some(*c),
            _ => None,
        }
    }

    /// Built only from symbols and constants.
    pub fn is_symbolic_or_constant(&self) -> bool {
        match self {
            Self::Dim(_) => false,
            Self::Symbol(_) | Self::Constant(_) => true,
            Self::Binary { lhs, rhs, .. } => lhs.is_symbolic_or_constant() && rhs.is_symbolic_or_constant(),
        }
    }

    /// Multiplication has at least one symbolic/constant side, and
    /// `floordiv`/`ceildiv`/`mod` have a symbolic/constant right-hand side.
    pub fn is_pure_affine(&self) -> bool {
        match self {
            Self::Dim(_) | Self::Symbol(_) | Self::Constant(_) => true,
            Self::Binary { kind: AffineKind::Add, lhs, rhs } => lhs.is_pure_affine() && rhs.is_pure_affine(),
            Self::Binary { kind: AffineKind::Mul, lhs, rhs } => {
                lhs.is_pure_affine()
                    && rhs.is_pure_affine()
                    && (lhs.is_symbolic_or_constant() || rhs.is_symbolic_or_constant())
            }
            Self::Binary { lhs, rhs, .. } => lhs.is_pure_affine() && rhs.is_symbolic_or_constant(),
        }
    }

    /// Largest dimension index referenced, plus one.
    pub fn dim_count(&self) -> usize {
        match self {
            Self::Dim(d) => d + 1,
            Self::Symbol(_) | Self::Constant(_) => 0,
            Self::Binary { lhs, rhs, .. } => lhs.dim_count().max(rhs.dim_count()),
        }
    }

    pub fn floor_div(self, rhs: impl Into<AffineExpr>) -> Self {
        Self::binary(AffineKind::FloorDiv, self, rhs.into())
    }

    pub fn ceil_div(self, rhs: impl Into<AffineExpr>) -> Self {
        Self::binary(AffineKind::CeilDiv, self, rhs.into())
    }

    pub fn modulo(self, rhs: impl Into<AffineExpr>) -> Self {
        Self::binary(AffineKind::Mod, self, rhs.into())
    }

    fn binary(kind: AffineKind, lhs: Self, rhs: Self) -> Self {
        use AffineExpr::Constant;

        if let (Constant(a), Constant(b)) = (&lhs, &rhs)
            && let Some(folded) = fold(kind, *a, *b)
        {
            return Constant(folded);
        }

        match kind {
            AffineKind::Add | AffineKind::Mul if matches!(lhs, Constant(_)) && !matches!(rhs, Constant(_)) => {
                Self::binary(kind, rhs, lhs)
            }
            AffineKind::Add if rhs == Constant(0) => lhs,
            AffineKind::Mul if rhs == Constant(1) => lhs,
            AffineKind::Mul if rhs == Constant(0) => Constant(0),
            AffineKind::FloorDiv | AffineKind::CeilDiv if rhs == Constant(1) => lhs,
            AffineKind::Mod if rhs == Constant(1) => Constant(0),
            _ => Self::Binary { kind, lhs: Box::new(lhs), rhs: Box::new(rhs) },
        }
    }

    /// Value of the expression, `None` on division by zero.
    pub fn eval(&self, dims: &[i64], symbols: &[i64]) -> Option<i64> {
        Some(match self {
            Self::Dim(d) => *dims.get(*d)?,
            Self::Symbol(s) => *symbols.get(*s)?,
            Self::Constant(c) => *c,
            Self::Binary { kind, lhs, rhs } => fold(*kind, lhs.eval(dims, symbols)?, rhs.eval(dims, symbols)?)?,
        })
    }
}

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    Some(if (a % b != 0) && ((a < 0) != (b < 0)) { q - 1 } else { q })
}

fn fold(kind: AffineKind, a: i64, b: i64) -> Option<i64> {
    match kind {
        AffineKind::Add => Some(a.wrapping_add(b)),
        AffineKind::Mul => Some(a.wrapping_mul(b)),
        AffineKind::FloorDiv => floor_div(a, b),
        AffineKind::CeilDiv => floor_div(a.checked_neg()?, b).map(|q| -q),
        AffineKind::Mod => floor_div(a, b).map(|q| a - b * q),
    }
}

impl From<i64> for AffineExpr {
    fn from(value: i64) -> Self {
        Self::Constant(value)
    }
}

impl<T: Into<AffineExpr>> Add<T> for AffineExpr {
    type Output = AffineExpr;

    fn add(self, rhs: T) -> AffineExpr {
        Self::binary(AffineKind::Add, self, rhs.into())
    }
}

impl<T: Into<AffineExpr>> Mul<T> for AffineExpr {
    type Output = AffineExpr;

    fn mul(self, rhs: T) -> AffineExpr {
        Self::binary(AffineKind::Mul, self, rhs.into())
    }
}

impl Neg for AffineExpr {
    type Output = AffineExpr;

    fn neg(self) -> AffineExpr {
        self * -1
    }
}

impl<T: Into<AffineExpr>> Sub<T> for AffineExpr {
    type Output = AffineExpr;

    fn sub(self, rhs: T) -> AffineExpr {
        self + (-rhs.into())
    }
}

impl fmt::Display for AffineExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dim(d) => write!(f, "d{d}"),
            Self::Symbol(s) => write!(f, "s{s}"),
            Self::Constant(c) => write!(f, "{c}"),
            Self::Binary { kind: AffineKind::Add, lhs, rhs } => match rhs.as_ref() {
                Self::Constant(c) if *c < 0 => write!(f, "{lhs} - {}", c.unsigned_abs()),
                Self::Binary { kind: AffineKind::Mul, lhs: negated, rhs: minus_one }
                    if **minus_one == Self::Constant(-1) =>
                {
                    write!(f, "{lhs} - ")?;
                    write_operand(f, negated)
                }
                _ => write!(f, "{lhs} + {rhs}"),
            },
            Self::Binary { kind, lhs, rhs } => {
                write_operand(f, lhs)?;
                write!(f, " {kind} ")?;
                write_operand(f, rhs)
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &AffineExpr) -> fmt::Result {
    match expr {
        AffineExpr::Binary { .. } => write!(f, "({expr})"),
        _ => write!(f, "{expr}"),
    }
}

/// Multi-result affine map `(d0, ..)[s0, ..] -> (e0, ..)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AffineMap {
    pub dims: usize,
    pub symbols: usize,
    pub results: SmallVec<[AffineExpr; 4]>,
}

impl AffineMap {
    pub fn new(dims: usize, symbols: usize, results: impl IntoIterator<Item = AffineExpr>) -> Self {
        Self { dims, symbols, results: results.into_iter().collect() }
    }

    /// `() -> (value)`
    pub fn constant(value: i64) -> Self {
        Self::new(0, 0, [AffineExpr::Constant(value)])
    }

    /// `(d0, .., dn-1) -> (d0, .., dn-1)`
    pub fn identity(dims: usize) -> Self {
        Self::new(dims, 0, (0..dims).map(AffineExpr::Dim))
    }

    pub fn as_constant(&self) -> Option<i64> {
        match self.results.as_slice() {
            [single] => single.as_constant(),
            _ => None,
        }
    }

    pub fn is_pure_affine(&self) -> bool {
        self.results.iter().all(AffineExpr::is_pure_affine)
    }

    pub fn eval(&self, dims: &[i64], symbols: &[i64]) -> Option<SmallVec<[i64; 4]>> {
        self.results.iter().map(|expr| expr.eval(dims, symbols)).collect()
    }
}

fn write_header(f: &mut fmt::Formatter<'_>, dims: usize, symbols: usize) -> fmt::Result {
    let dims: Vec<_> = (0..dims).map(|d| format!("d{d}")).collect();
    write!(f, "({})", dims.join(", "))?;
    if symbols > 0 {
        let symbols: Vec<_> = (0..symbols).map(|s| format!("s{s}")).collect();
        write!(f, "[{}]", symbols.join(", "))?;
    }
    Ok(())
}

impl fmt::Display for AffineMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_header(f, self.dims, self.symbols)?;
        let results: Vec<_> = self.results.iter().map(ToString::to_string).collect();
        write!(f, " -> ({})", results.join(", "))
    }
}

/// Conjunction of affine constraints, each either `e == 0` or `e >= 0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntegerSet {
    pub dims: usize,
    pub symbols: usize,
    pub constraints: Vec<(AffineExpr, bool)>,
}

impl IntegerSet {
    /// `(d0) : (d0 - 1 == 0)`, true for a 1-valued condition.
    pub fn is_one() -> Self {
        Self { dims: 1, symbols: 0, constraints: vec![(AffineExpr::dim(0) - 1, true)] }
    }

    pub fn contains(&self, dims: &[i64], symbols: &[i64]) -> Option<bool> {
        for (expr, is_eq) in &self.constraints {
            let value = expr.eval(dims, symbols)?;
            if (*is_eq && value != 0) || (!*is_eq && value < 0) {
                return Some(false);
            }
        }
        Some(true)
    }
}

impl fmt::Display for IntegerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_header(f, self.dims, self.symbols)?;
        let constraints: Vec<_> = self
            .constraints
            .iter()
            .map(|(expr, is_eq)| format!("{expr} {} 0", if *is_eq { "==" } else { ">=" }))
            .collect();
        write!(f, " : ({})", constraints.join(", "))
    }
}
