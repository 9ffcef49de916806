use super::Expr;

/// Logical conjunction over two or more operands, short-circuiting
/// left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprAnd {
    pub operands: Vec<Expr>,
}

impl Expr {
    pub fn and(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        ExprAnd {
            operands: vec![lhs.into(), rhs.into()],
        }
        .into()
    }
}

impl From<ExprAnd> for Expr {
    fn from(value: ExprAnd) -> Expr {
        Expr::And(value)
    }
}
