mod cache;

mod cmp_op;
pub use cmp_op::CmpOp;

mod context;
pub use context::{EvalContext, PARAMETER_KEY};

mod eval;

mod expr_and;
pub use expr_and::ExprAnd;

mod expr_cmp;
pub use expr_cmp::ExprCmp;

mod expr_not;
pub use expr_not::ExprNot;

mod expr_or;
pub use expr_or::ExprOr;

mod parse;

use crate::{Path, Value};

/// A compiled boolean/path expression.
///
/// This is the small language behind `test=`, `collection=`, `${}` and
/// `<bind value=..>`: property paths into the parameter object,
/// literals, comparisons, and boolean combinators. Compiled once and
/// shared; evaluation happens per call against an [`EvalContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value
    Value(Value),

    /// A property path resolved against the binding context
    Path(Path),

    /// A binary comparison
    Cmp(ExprCmp),

    /// Logical conjunction
    And(ExprAnd),

    /// Logical disjunction
    Or(ExprOr),

    /// Logical negation
    Not(ExprNot),
}

impl Expr {
    pub fn value(value: impl Into<Value>) -> Expr {
        Expr::Value(value.into())
    }

    pub fn path(path: Path) -> Expr {
        Expr::Path(path)
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Expr {
        Expr::Value(value)
    }
}

impl From<Path> for Expr {
    fn from(path: Path) -> Expr {
        Expr::Path(path)
    }
}
