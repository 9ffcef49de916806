use super::{IfNode, SqlNode};
use crate::RenderContext;
use rowmap_core::Result;

/// `choose/when/otherwise` selection: applies the first `when` whose
/// test fires, else the default branch, else nothing.
///
/// A duplicate default branch is rejected at compile time by the
/// parser.
#[derive(Debug, Clone)]
pub struct ChooseNode {
    pub whens: Vec<IfNode>,
    pub otherwise: Option<Box<SqlNode>>,
}

impl ChooseNode {
    pub(crate) fn apply(&self, ctx: &mut RenderContext<'_>) -> Result<bool> {
        for when in &self.whens {
            if when.apply(ctx)? {
                return Ok(true);
            }
        }

        if let Some(otherwise) = &self.otherwise {
            otherwise.apply(ctx)?;
            return Ok(true);
        }

        Ok(false)
    }
}

impl From<ChooseNode> for SqlNode {
    fn from(value: ChooseNode) -> SqlNode {
        SqlNode::Choose(value)
    }
}
