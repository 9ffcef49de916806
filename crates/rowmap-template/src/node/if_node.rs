use super::SqlNode;
use crate::RenderContext;
use rowmap_core::{Expr, Result};

use std::sync::Arc;

/// Conditional block: applies its child when the test expression is
/// truthy, and reports whether it fired.
#[derive(Debug, Clone)]
pub struct IfNode {
    pub test: Arc<Expr>,
    pub child: Box<SqlNode>,
}

impl IfNode {
    pub fn new(test: Arc<Expr>, child: SqlNode) -> IfNode {
        IfNode {
            test,
            child: Box::new(child),
        }
    }

    pub(crate) fn apply(&self, ctx: &mut RenderContext<'_>) -> Result<bool> {
        if self.test.eval_bool(&ctx.eval_cx())? {
            self.child.apply(ctx)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

impl From<IfNode> for SqlNode {
    fn from(value: IfNode) -> SqlNode {
        SqlNode::If(value)
    }
}
