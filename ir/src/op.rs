//! Operation kinds of the target IR and comparison predicate codes.

use kiln_dtype::Category;

/// Every operation the builder can emit, named by dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::IntoStaticStr)]
pub enum OpKind {
    // arith: integer
    #[strum(serialize = "arith.constant")]
    Constant,
    #[strum(serialize = "arith.addi")]
    AddI,
    #[strum(serialize = "arith.subi")]
    SubI,
    #[strum(serialize = "arith.muli")]
    MulI,
    #[strum(serialize = "arith.divsi")]
    DivSI,
    #[strum(serialize = "arith.divui")]
    DivUI,
    #[strum(serialize = "arith.floordivsi")]
    FloorDivSI,
    #[strum(serialize = "arith.remsi")]
    RemSI,
    #[strum(serialize = "arith.remui")]
    RemUI,
    #[strum(serialize = "arith.minsi")]
    MinSI,
    #[strum(serialize = "arith.maxsi")]
    MaxSI,
    #[strum(serialize = "arith.minui")]
    MinUI,
    #[strum(serialize = "arith.maxui")]
    MaxUI,
    #[strum(serialize = "arith.shli")]
    ShLI,
    #[strum(serialize = "arith.shrsi")]
    ShRSI,
    #[strum(serialize = "arith.shrui")]
    ShRUI,
    #[strum(serialize = "arith.andi")]
    AndI,
    #[strum(serialize = "arith.ori")]
    OrI,
    #[strum(serialize = "arith.xori")]
    XOrI,
    #[strum(serialize = "arith.cmpi")]
    CmpI,

    // arith: float
    #[strum(serialize = "arith.addf")]
    AddF,
    #[strum(serialize = "arith.subf")]
    SubF,
    #[strum(serialize = "arith.mulf")]
    MulF,
    #[strum(serialize = "arith.divf")]
    DivF,
    #[strum(serialize = "arith.remf")]
    RemF,
    #[strum(serialize = "arith.minimumf")]
    MinF,
    #[strum(serialize = "arith.maximumf")]
    MaxF,
    #[strum(serialize = "arith.negf")]
    NegF,
    #[strum(serialize = "arith.cmpf")]
    CmpF,

    // fixed point
    #[strum(serialize = "kiln.add_fixed")]
    AddFixed,
    #[strum(serialize = "kiln.sub_fixed")]
    SubFixed,
    #[strum(serialize = "kiln.mul_fixed")]
    MulFixed,
    #[strum(serialize = "kiln.div_fixed")]
    DivFixed,
    #[strum(serialize = "kiln.min_fixed")]
    MinFixed,
    #[strum(serialize = "kiln.max_fixed")]
    MaxFixed,
    #[strum(serialize = "kiln.cmp_fixed")]
    CmpFixed,
    #[strum(serialize = "kiln.get_bit")]
    GetBit,

    // math
    #[strum(serialize = "math.exp")]
    Exp,
    #[strum(serialize = "math.log")]
    Log,
    #[strum(serialize = "math.log2")]
    Log2,
    #[strum(serialize = "math.log10")]
    Log10,
    #[strum(serialize = "math.sqrt")]
    Sqrt,
    #[strum(serialize = "math.sin")]
    Sin,
    #[strum(serialize = "math.cos")]
    Cos,
    #[strum(serialize = "math.tanh")]
    Tanh,
    #[strum(serialize = "math.floor")]
    Floor,

    // casts and selection
    #[strum(serialize = "arith.index_cast")]
    IndexCast,
    #[strum(serialize = "builtin.unrealized_conversion_cast")]
    UnrealizedCast,
    #[strum(serialize = "arith.select")]
    Select,

    // memory and control flow
    #[strum(serialize = "memref.alloc")]
    Alloc,
    #[strum(serialize = "affine.load")]
    AffineLoad,
    #[strum(serialize = "affine.store")]
    AffineStore,
    #[strum(serialize = "affine.for")]
    AffineFor,
    #[strum(serialize = "affine.if")]
    AffineIf,
    #[strum(serialize = "affine.yield")]
    AffineYield,
    #[strum(serialize = "func.func")]
    Func,
    #[strum(serialize = "func.call")]
    Call,
    #[strum(serialize = "func.return")]
    Return,
}

impl OpKind {
    /// Block terminators.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Self::AffineYield | Self::Return)
    }

    pub fn is_compare(&self) -> bool {
        matches!(self, Self::CmpI | Self::CmpF | Self::CmpFixed)
    }

    /// Comparison operation for an operand category.
    pub fn compare_for(category: Category) -> Self {
        match category {
            Category::Int => Self::CmpI,
            Category::Float => Self::CmpF,
            Category::Fixed => Self::CmpFixed,
        }
    }
}

/// Integer (and fixed point) comparison predicates, by code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::FromRepr)]
#[strum(serialize_all = "lowercase")]
#[repr(i64)]
pub enum CmpIPredicate {
    Eq = 0,
    Ne = 1,
    Slt = 2,
    Sle = 3,
    Sgt = 4,
    Sge = 5,
    Ult = 6,
    Ule = 7,
    Ugt = 8,
    Uge = 9,
}

/// Floating point comparison predicates, by code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::FromRepr)]
#[strum(serialize_all = "lowercase")]
#[repr(i64)]
pub enum CmpFPredicate {
    False = 0,
    Oeq = 1,
    Ogt = 2,
    Oge = 3,
    Olt = 4,
    Ole = 5,
    One = 6,
    Ord = 7,
    Ueq = 8,
    Ugt = 9,
    Uge = 10,
    Ult = 11,
    Ule = 12,
    Une = 13,
    Uno = 14,
    True = 15,
}

impl CmpIPredicate {
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn eval<T: Ord>(self, lhs: T, rhs: T) -> bool {
        use CmpIPredicate::*;
        match self {
            Eq => lhs == rhs,
            Ne => lhs != rhs,
            Slt | Ult => lhs < rhs,
            Sle | Ule => lhs <= rhs,
            Sgt | Ugt => lhs > rhs,
            Sge | Uge => lhs >= rhs,
        }
    }
}

impl CmpFPredicate {
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn eval(self, lhs: f64, rhs: f64) -> bool {
        use CmpFPredicate::*;
        let unordered = lhs.is_nan() || rhs.is_nan();
        match self {
            False => false,
            True => true,
            Ord => !unordered,
            Uno => unordered,
            Oeq => !unordered && lhs == rhs,
            Ogt => !unordered && lhs > rhs,
            Oge => !unordered && lhs >= rhs,
            Olt => !unordered && lhs < rhs,
            Ole => !unordered && lhs <= rhs,
            One => !unordered && lhs != rhs,
            Ueq => unordered || lhs == rhs,
            Ugt => unordered || lhs > rhs,
            Uge => unordered || lhs >= rhs,
            Ult => unordered || lhs < rhs,
            Ule => unordered || lhs <= rhs,
            Une => unordered || lhs != rhs,
        }
    }
}
