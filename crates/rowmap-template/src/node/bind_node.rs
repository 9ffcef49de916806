use super::SqlNode;
use crate::RenderContext;
use rowmap_core::{Expr, Result};

use std::sync::Arc;

/// `<bind name=".." value="expr"/>`: evaluates once and injects the
/// result into the binding context. Contributes no text.
#[derive(Debug, Clone)]
pub struct BindNode {
    pub name: String,
    pub value: Arc<Expr>,
}

impl BindNode {
    pub(crate) fn apply(&self, ctx: &mut RenderContext<'_>) -> Result<bool> {
        let value = self.value.eval_value(&ctx.eval_cx())?;
        ctx.bind(&self.name, value);
        Ok(true)
    }
}

impl From<BindNode> for SqlNode {
    fn from(value: BindNode) -> SqlNode {
        SqlNode::Bind(value)
    }
}
