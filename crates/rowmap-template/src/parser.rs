use crate::node::{
    BindNode, ChooseNode, ForeachNode, IfNode, MixedNode, SqlNode, StaticTextNode, TextNode,
    TrimNode,
};
use crate::source::{extract_markers, DynamicSql, RawSql, SqlSource};
use crate::{token, RenderContext};

use indexmap::IndexMap;
use rowmap_core::{Error, Expr, Result, Value};

/// Cap on recursive fragment expansion. A fragment may not legally
/// re-include itself without bound; this converts runaway inclusion
/// into a compile error.
const MAX_INCLUDE_DEPTH: usize = 16;

const KNOWN_TAGS: &[&str] = &[
    "if",
    "choose",
    "when",
    "otherwise",
    "trim",
    "where",
    "set",
    "foreach",
    "bind",
    "include",
];

/// Compiles statement template text into a [`SqlSource`].
///
/// Named reusable fragments registered on the parser are expanded in
/// place at compile time. Compilation errors are fatal; no partial
/// template is ever published.
#[derive(Debug, Default)]
pub struct TemplateParser {
    fragments: IndexMap<String, String>,
}

impl TemplateParser {
    pub fn new() -> TemplateParser {
        TemplateParser::default()
    }

    pub fn add_fragment(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.fragments.insert(id.into(), text.into());
    }

    pub fn parse(&self, text: &str) -> Result<SqlSource> {
        let expanded = self.expand_includes(text)?;

        let mut scanner = Scanner {
            text: &expanded,
            pos: 0,
        };
        let children = parse_children(&mut scanner, None)?;
        let root: SqlNode = MixedNode::new(children).into();

        if root.is_dynamic() {
            return Ok(SqlSource::Dynamic(DynamicSql { root }));
        }

        // Static tree: apply it once now. No node consults the
        // parameter, so the text is final and per-call rendering can
        // skip the walk entirely.
        let mut ctx = RenderContext::new(&Value::Null, None);
        root.apply(&mut ctx)?;
        let (text, _) = ctx.into_parts();
        let (sql, markers) = extract_markers(&text)?;

        Ok(SqlSource::Raw(RawSql { sql, markers }))
    }

    fn expand_includes(&self, text: &str) -> Result<String> {
        let mut expanded = text.to_string();

        for _ in 0..MAX_INCLUDE_DEPTH {
            let Some(start) = expanded.find("<include") else {
                return Ok(expanded);
            };

            let tag = parse_tag(&expanded[start..])?.ok_or_else(|| {
                Error::template_compile("malformed <include> tag")
            })?;
            if !tag.self_closing {
                return Err(Error::template_compile(
                    "<include> must be self-closing",
                ));
            }
            let refid = tag.require_attr("include", "refid")?;
            let fragment = self.fragments.get(&refid).ok_or_else(|| {
                Error::template_compile(format!("unknown fragment `{refid}`"))
            })?;

            expanded.replace_range(start..start + tag.len, fragment);
        }

        Err(Error::template_compile(format!(
            "fragment inclusion exceeds depth {MAX_INCLUDE_DEPTH}"
        )))
    }
}

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

#[derive(Debug)]
struct Tag {
    name: String,
    attrs: IndexMap<String, String>,
    closing: bool,
    self_closing: bool,
    /// Byte length of the tag's source text.
    len: usize,
}

impl Tag {
    fn attr(&self, name: &str) -> Option<String> {
        self.attrs.get(name).cloned()
    }

    fn require_attr(&self, tag: &str, name: &str) -> Result<String> {
        self.attr(name).ok_or_else(|| {
            Error::template_compile(format!("<{tag}> requires a `{name}` attribute"))
        })
    }
}

/// Parses the nodes of one nesting level, stopping at the matching
/// close tag (or end of input at the top level).
fn parse_children(scanner: &mut Scanner<'_>, expect_close: Option<&str>) -> Result<Vec<SqlNode>> {
    let mut children = vec![];

    loop {
        let (text, tag) = scan_to_tag(scanner)?;

        if let Some(node) = make_text_node(text) {
            children.push(node);
        }

        let Some(tag) = tag else {
            return match expect_close {
                None => Ok(children),
                Some(name) => Err(Error::template_compile(format!("unclosed <{name}> tag"))),
            };
        };

        if tag.closing {
            if expect_close == Some(tag.name.as_str()) {
                return Ok(children);
            }
            return Err(Error::template_compile(format!(
                "unexpected closing tag </{}>",
                tag.name
            )));
        }

        children.push(parse_element(scanner, tag)?);
    }
}

fn parse_element(scanner: &mut Scanner<'_>, tag: Tag) -> Result<SqlNode> {
    match tag.name.as_str() {
        "if" => {
            let test = Expr::compile(&tag.require_attr("if", "test")?)?;
            let child = mixed(parse_children(scanner, Some("if"))?);
            Ok(IfNode::new(test, child).into())
        }
        "where" => {
            let child = mixed(parse_children(scanner, Some("where"))?);
            Ok(TrimNode::where_node(child).into())
        }
        "set" => {
            let child = mixed(parse_children(scanner, Some("set"))?);
            Ok(TrimNode::set_node(child).into())
        }
        "trim" => {
            let prefix = tag.attr("prefix");
            let suffix = tag.attr("suffix");
            let prefix_overrides = split_overrides(tag.attr("prefixOverrides"));
            let suffix_overrides = split_overrides(tag.attr("suffixOverrides"));
            let child = mixed(parse_children(scanner, Some("trim"))?);
            Ok(TrimNode::new(prefix, suffix, prefix_overrides, suffix_overrides, child).into())
        }
        "foreach" => {
            let collection = Expr::compile(&tag.require_attr("foreach", "collection")?)?;
            let item = tag.require_attr("foreach", "item")?;
            let node = ForeachNode {
                collection,
                item,
                index: tag.attr("index"),
                open: tag.attr("open"),
                close: tag.attr("close"),
                separator: tag.attr("separator"),
                child: Box::new(mixed(parse_children(scanner, Some("foreach"))?)),
            };
            Ok(node.into())
        }
        "bind" => {
            if !tag.self_closing {
                return Err(Error::template_compile("<bind> must be self-closing"));
            }
            let name = tag.require_attr("bind", "name")?;
            let value = Expr::compile(&tag.require_attr("bind", "value")?)?;
            Ok(BindNode { name, value }.into())
        }
        "choose" => parse_choose(scanner),
        "when" | "otherwise" => Err(Error::template_compile(format!(
            "<{}> is only valid inside <choose>",
            tag.name
        ))),
        other => Err(Error::template_compile(format!("unknown tag <{other}>"))),
    }
}

fn parse_choose(scanner: &mut Scanner<'_>) -> Result<SqlNode> {
    let mut whens = vec![];
    let mut otherwise: Option<Box<SqlNode>> = None;

    loop {
        let (text, tag) = scan_to_tag(scanner)?;

        if !text.trim().is_empty() {
            return Err(Error::template_compile(
                "text inside <choose> must be wrapped in <when> or <otherwise>",
            ));
        }

        let Some(tag) = tag else {
            return Err(Error::template_compile("unclosed <choose> tag"));
        };

        match (tag.closing, tag.name.as_str()) {
            (true, "choose") => {
                return Ok(ChooseNode { whens, otherwise }.into());
            }
            (false, "when") => {
                let test = Expr::compile(&tag.require_attr("when", "test")?)?;
                let child = mixed(parse_children(scanner, Some("when"))?);
                whens.push(IfNode::new(test, child));
            }
            (false, "otherwise") => {
                let child = mixed(parse_children(scanner, Some("otherwise"))?);
                if otherwise.is_some() {
                    return Err(Error::template_compile(
                        "<choose> declares more than one <otherwise>",
                    ));
                }
                otherwise = Some(Box::new(child));
            }
            _ => {
                return Err(Error::template_compile(format!(
                    "unexpected <{}> inside <choose>",
                    tag.name
                )))
            }
        }
    }
}

/// Advances to the next recognized tag, returning the literal text
/// skipped over and the tag itself (`None` at end of input).
fn scan_to_tag<'a>(scanner: &mut Scanner<'a>) -> Result<(&'a str, Option<Tag>)> {
    let start = scanner.pos;
    let mut search = scanner.pos;

    while let Some(offset) = scanner.text[search..].find('<') {
        let at = search + offset;
        if let Some(tag) = parse_tag(&scanner.text[at..])? {
            let text = &scanner.text[start..at];
            scanner.pos = at + tag.len;
            return Ok((text, Some(tag)));
        }
        search = at + 1;
    }

    scanner.pos = scanner.text.len();
    Ok((&scanner.text[start..], None))
}

/// Attempts to parse a control tag at the start of `text` (which
/// begins with `<`). Returns `Ok(None)` when the `<` does not open a
/// known tag, so SQL like `a < b` passes through as literal text.
fn parse_tag(text: &str) -> Result<Option<Tag>> {
    let mut rest = &text[1..];

    let closing = rest.starts_with('/');
    if closing {
        rest = &rest[1..];
    }

    let name_len = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let name = &rest[..name_len];

    if !KNOWN_TAGS.contains(&name) {
        return Ok(None);
    }
    match rest[name_len..].chars().next() {
        Some(c) if c == '>' || c == '/' || c.is_whitespace() => {}
        _ => return Ok(None),
    }

    rest = &rest[name_len..];
    let mut attrs = IndexMap::new();
    let mut self_closing = false;

    loop {
        rest = rest.trim_start();

        if let Some(after) = rest.strip_prefix("/>") {
            self_closing = true;
            rest = after;
            break;
        }
        if let Some(after) = rest.strip_prefix('>') {
            rest = after;
            break;
        }
        if rest.is_empty() {
            return Err(Error::template_compile(format!("unterminated <{name}> tag")));
        }

        let eq = rest.find('=').ok_or_else(|| {
            Error::template_compile(format!("malformed attribute in <{name}>"))
        })?;
        let attr_name = rest[..eq].trim().to_string();
        rest = rest[eq + 1..].trim_start();

        let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'');
        let Some(quote) = quote else {
            return Err(Error::template_compile(format!(
                "attribute `{attr_name}` in <{name}> must be quoted"
            )));
        };
        rest = &rest[1..];
        let end = rest.find(quote).ok_or_else(|| {
            Error::template_compile(format!(
                "unterminated attribute `{attr_name}` in <{name}>"
            ))
        })?;
        attrs.insert(attr_name, rest[..end].to_string());
        rest = &rest[end + 1..];
    }

    if closing && (self_closing || !attrs.is_empty()) {
        return Err(Error::template_compile(format!(
            "malformed closing tag </{name}>"
        )));
    }

    Ok(Some(Tag {
        name: name.to_string(),
        attrs,
        closing,
        self_closing,
        len: text.len() - rest.len(),
    }))
}

fn make_text_node(text: &str) -> Option<SqlNode> {
    if text.trim().is_empty() {
        return None;
    }

    if token::contains_token("${", "}", text) {
        Some(TextNode::new(text).into())
    } else {
        Some(StaticTextNode::new(text).into())
    }
}

fn mixed(children: Vec<SqlNode>) -> SqlNode {
    MixedNode::new(children).into()
}

fn split_overrides(attr: Option<String>) -> Vec<String> {
    attr.map(|src| src.split('|').map(str::to_string).collect())
        .unwrap_or_default()
}
