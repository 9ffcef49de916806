use super::{CmpOp, Expr};

/// A binary comparison between two expressions.
///
/// Equality is defined for any pair of values (with numeric widening);
/// ordered comparison against null or between incompatible types is an
/// evaluation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprCmp {
    /// The left-hand side expression.
    pub lhs: Box<Expr>,

    /// The operator to apply.
    pub op: CmpOp,

    /// The right-hand side expression.
    pub rhs: Box<Expr>,
}

impl Expr {
    pub fn cmp(lhs: impl Into<Expr>, op: CmpOp, rhs: impl Into<Expr>) -> Expr {
        ExprCmp {
            lhs: Box::new(lhs.into()),
            op,
            rhs: Box::new(rhs.into()),
        }
        .into()
    }

    pub fn eq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        Expr::cmp(lhs, CmpOp::Eq, rhs)
    }

    pub fn ne(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        Expr::cmp(lhs, CmpOp::Ne, rhs)
    }

    pub fn lt(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        Expr::cmp(lhs, CmpOp::Lt, rhs)
    }

    pub fn gt(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        Expr::cmp(lhs, CmpOp::Gt, rhs)
    }
}

impl From<ExprCmp> for Expr {
    fn from(value: ExprCmp) -> Expr {
        Expr::Cmp(value)
    }
}
