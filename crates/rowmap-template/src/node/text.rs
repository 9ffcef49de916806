use super::SqlNode;
use crate::{token, RenderContext};
use rowmap_core::{Error, Expr, Result};

/// Raw text containing `${}` substitutions.
///
/// Each enclosed expression is evaluated immediately at apply time and
/// its textual form spliced in, with no escaping. When an injection
/// guard pattern is configured, every substituted value must match it.
#[derive(Debug, Clone)]
pub struct TextNode {
    pub text: String,
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> TextNode {
        TextNode { text: text.into() }
    }

    pub(crate) fn apply(&self, ctx: &mut RenderContext<'_>) -> Result<bool> {
        let substituted = token::parse_tokens("${", "}", self.text.trim(), &mut |content| {
            let value = Expr::compile(content)?.eval_value(&ctx.eval_cx())?;
            let text = value.to_text();

            if let Some(guard) = ctx.guard() {
                if !guard.is_match(&text) {
                    return Err(Error::invalid_substitution(text));
                }
            }

            Ok(text)
        })?;

        ctx.append_sql(&substituted);
        Ok(true)
    }
}

impl From<TextNode> for SqlNode {
    fn from(value: TextNode) -> SqlNode {
        SqlNode::Text(value)
    }
}
