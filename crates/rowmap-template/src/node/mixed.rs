use super::SqlNode;
use crate::RenderContext;
use rowmap_core::Result;

/// Ordered children; contributions are space-separated by the
/// context's append rule.
#[derive(Debug, Clone)]
pub struct MixedNode {
    pub children: Vec<SqlNode>,
}

impl MixedNode {
    pub fn new(children: Vec<SqlNode>) -> MixedNode {
        MixedNode { children }
    }

    pub(crate) fn apply(&self, ctx: &mut RenderContext<'_>) -> Result<bool> {
        for child in &self.children {
            child.apply(ctx)?;
        }
        Ok(true)
    }
}

impl From<MixedNode> for SqlNode {
    fn from(value: MixedNode) -> SqlNode {
        SqlNode::Mixed(value)
    }
}
