use super::SqlNode;
use crate::RenderContext;
use rowmap_core::Result;

/// Literal SQL text, appended as-is.
#[derive(Debug, Clone)]
pub struct StaticTextNode {
    pub text: String,
}

impl StaticTextNode {
    pub fn new(text: impl Into<String>) -> StaticTextNode {
        StaticTextNode { text: text.into() }
    }

    pub(crate) fn apply(&self, ctx: &mut RenderContext<'_>) -> Result<bool> {
        ctx.append_sql(self.text.trim());
        Ok(true)
    }
}

impl From<StaticTextNode> for SqlNode {
    fn from(value: StaticTextNode) -> SqlNode {
        SqlNode::StaticText(value)
    }
}
