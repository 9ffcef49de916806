use super::Expr;

/// Logical disjunction over two or more operands, short-circuiting
/// left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprOr {
    pub operands: Vec<Expr>,
}

impl Expr {
    pub fn or(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        ExprOr {
            operands: vec![lhs.into(), rhs.into()],
        }
        .into()
    }
}

impl From<ExprOr> for Expr {
    fn from(value: ExprOr) -> Expr {
        Expr::Or(value)
    }
}
