use super::SqlNode;
use crate::{token, RenderContext};
use rowmap_core::{Expr, Result};

use std::sync::Arc;

/// Iteration block.
///
/// Per element, the item (and index) are bound under their declared
/// names and under an internally-disambiguated per-iteration name;
/// `#{}` references to the declared names inside the body are
/// rewritten to the disambiguated form so repeated bodies do not
/// collide. The plain bindings are removed once the loop finishes so
/// they do not leak into sibling nodes; the disambiguated ones stay
/// for the parameter binder.
#[derive(Debug, Clone)]
pub struct ForeachNode {
    pub collection: Arc<Expr>,
    pub item: String,
    pub index: Option<String>,
    pub open: Option<String>,
    pub close: Option<String>,
    pub separator: Option<String>,
    pub child: Box<SqlNode>,
}

impl ForeachNode {
    pub(crate) fn apply(&self, ctx: &mut RenderContext<'_>) -> Result<bool> {
        let entries = self.collection.eval_iterable(&ctx.eval_cx())?;

        // An empty sequence emits nothing, not even open/close.
        if entries.is_empty() {
            return Ok(true);
        }

        if let Some(open) = &self.open {
            ctx.append_sql(open);
        }

        let mut emitted = false;

        for (key, item) in entries {
            let n = ctx.next_unique();

            ctx.bind(&self.item, item.clone());
            ctx.bind(&itemized(&self.item, n), item);
            if let Some(index) = &self.index {
                ctx.bind(index, key.clone());
                ctx.bind(&itemized(index, n), key);
            }

            let (body, _) = ctx.capture(|ctx| self.child.apply(ctx))?;
            let body = self.rewrite_item_refs(body.trim(), n)?;

            if !body.is_empty() {
                if emitted {
                    if let Some(separator) = &self.separator {
                        ctx.append_sql(separator);
                    }
                }
                ctx.append_sql(&body);
                emitted = true;
            }
        }

        if let Some(close) = &self.close {
            ctx.append_sql(close);
        }

        ctx.remove_binding(&self.item);
        if let Some(index) = &self.index {
            ctx.remove_binding(index);
        }

        Ok(true)
    }

    /// Rewrites `#{item...}` (and `#{index...}`) markers in the
    /// rendered body to their per-iteration names.
    fn rewrite_item_refs(&self, body: &str, n: u32) -> Result<String> {
        token::parse_tokens("#{", "}", body, &mut |content| {
            let rewritten = rewrite_root(content, &self.item, n)
                .or_else(|| {
                    self.index
                        .as_deref()
                        .and_then(|index| rewrite_root(content, index, n))
                })
                .unwrap_or_else(|| content.to_string());
            Ok(format!("#{{{rewritten}}}"))
        })
    }
}

fn itemized(name: &str, n: u32) -> String {
    format!("__frch_{name}_{n}")
}

/// When the marker's property path starts with `name`, returns the
/// content with the root renamed to the per-iteration form.
fn rewrite_root(content: &str, name: &str, n: u32) -> Option<String> {
    let trimmed = content.trim_start();
    let rest = trimmed.strip_prefix(name)?;

    // Only a whole-segment match counts: `item.id`, `item[0]`,
    // `item, attr=..` or bare `item` -- not `items`.
    match rest.chars().next() {
        None | Some('.') | Some('[') | Some(',') => {
            Some(format!("{}{}", itemized(name, n), rest))
        }
        _ => None,
    }
}

impl From<ForeachNode> for SqlNode {
    fn from(value: ForeachNode) -> SqlNode {
        SqlNode::Foreach(value)
    }
}
