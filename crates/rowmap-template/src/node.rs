mod bind_node;
pub use bind_node::BindNode;

mod choose;
pub use choose::ChooseNode;

mod foreach;
pub use foreach::ForeachNode;

mod if_node;
pub use if_node::IfNode;

mod mixed;
pub use mixed::MixedNode;

mod static_text;
pub use static_text::StaticTextNode;

mod text;
pub use text::TextNode;

mod trim;
pub use trim::TrimNode;

use crate::RenderContext;
use rowmap_core::Result;

/// One node of a compiled statement template.
///
/// The tree is immutable after compile; all per-call state lives in
/// the [`RenderContext`] a node is applied against.
#[derive(Debug, Clone)]
pub enum SqlNode {
    /// Literal SQL text with no substitutions
    StaticText(StaticTextNode),

    /// Raw text carrying `${}` substitutions
    Text(TextNode),

    /// Conditional block
    If(IfNode),

    /// First-true-branch selection with an optional default
    Choose(ChooseNode),

    /// Iteration block
    Foreach(ForeachNode),

    /// Prefix/suffix add-and-strip block
    Trim(TrimNode),

    /// Variable binding, contributes no text
    Bind(BindNode),

    /// Ordered children, space-separated contributions
    Mixed(MixedNode),
}

impl SqlNode {
    /// Applies the node against the per-call context, appending SQL
    /// text and bindings. Returns whether the node contributed,
    /// which a parent `Choose` uses to pick at most one branch.
    pub fn apply(&self, ctx: &mut RenderContext<'_>) -> Result<bool> {
        match self {
            SqlNode::StaticText(node) => node.apply(ctx),
            SqlNode::Text(node) => node.apply(ctx),
            SqlNode::If(node) => node.apply(ctx),
            SqlNode::Choose(node) => node.apply(ctx),
            SqlNode::Foreach(node) => node.apply(ctx),
            SqlNode::Trim(node) => node.apply(ctx),
            SqlNode::Bind(node) => node.apply(ctx),
            SqlNode::Mixed(node) => node.apply(ctx),
        }
    }

    /// `true` when applying this node can produce different text for
    /// different parameters. Static-only trees take the raw path and
    /// are never re-walked per call.
    pub fn is_dynamic(&self) -> bool {
        match self {
            SqlNode::StaticText(_) => false,
            SqlNode::Mixed(node) => node.children.iter().any(SqlNode::is_dynamic),
            _ => true,
        }
    }
}
