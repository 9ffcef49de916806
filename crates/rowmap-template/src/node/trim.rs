use super::SqlNode;
use crate::RenderContext;
use rowmap_core::Result;

/// Prefix/suffix add-and-strip block.
///
/// The child's output is buffered separately; the first matching
/// override token is stripped case-insensitively from each end, then
/// the prefix/suffix are added. Each application processes its own
/// buffer exactly once, so at most one prefix and one suffix
/// application occur even under nested trim/iteration combinations.
#[derive(Debug, Clone)]
pub struct TrimNode {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub prefix_overrides: Vec<String>,
    pub suffix_overrides: Vec<String>,
    pub child: Box<SqlNode>,
}

impl TrimNode {
    pub fn new(
        prefix: Option<String>,
        suffix: Option<String>,
        prefix_overrides: Vec<String>,
        suffix_overrides: Vec<String>,
        child: SqlNode,
    ) -> TrimNode {
        TrimNode {
            prefix,
            suffix,
            prefix_overrides,
            suffix_overrides,
            child: Box::new(child),
        }
    }

    /// `<where>`: adds `WHERE`, strips a leading boolean operator.
    pub fn where_node(child: SqlNode) -> TrimNode {
        TrimNode::new(
            Some("WHERE".to_string()),
            None,
            ["AND ", "OR ", "AND\t", "OR\t", "AND\n", "OR\n"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            vec![],
            child,
        )
    }

    /// `<set>`: adds `SET`, strips leading and trailing separators.
    pub fn set_node(child: SqlNode) -> TrimNode {
        TrimNode::new(
            Some("SET".to_string()),
            None,
            vec![",".to_string()],
            vec![",".to_string()],
            child,
        )
    }

    pub(crate) fn apply(&self, ctx: &mut RenderContext<'_>) -> Result<bool> {
        let (body, fired) = ctx.capture(|ctx| self.child.apply(ctx))?;
        let mut body = body.trim().to_string();

        if body.is_empty() {
            return Ok(fired);
        }

        for over in &self.prefix_overrides {
            if starts_with_ignore_case(&body, over) {
                body.replace_range(..over.len(), "");
                body = body.trim_start().to_string();
                break;
            }
        }

        for over in &self.suffix_overrides {
            if ends_with_ignore_case(&body, over) {
                body.truncate(body.len() - over.len());
                body.truncate(body.trim_end().len());
                break;
            }
        }

        if let Some(prefix) = &self.prefix {
            body.insert(0, ' ');
            body.insert_str(0, prefix);
        }

        if let Some(suffix) = &self.suffix {
            body.push(' ');
            body.push_str(suffix);
        }

        ctx.append_sql(&body);
        Ok(fired)
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len() && text[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn ends_with_ignore_case(text: &str, suffix: &str) -> bool {
    text.len() >= suffix.len() && text[text.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

impl From<TrimNode> for SqlNode {
    fn from(value: TrimNode) -> SqlNode {
        SqlNode::Trim(value)
    }
}
