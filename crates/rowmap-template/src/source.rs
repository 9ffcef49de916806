use crate::{token, ParameterMarker, RenderContext, SqlNode};

use indexmap::IndexMap;
use regex::Regex;
use rowmap_core::{Result, Value};
use tracing::trace;

/// A compiled statement template, ready to render per call.
///
/// Static templates (no control tag, no `${}` anywhere, fragments
/// included) take the `Raw` path: the final text and marker list are
/// computed once at compile time and rendering never walks a tree.
#[derive(Debug, Clone)]
pub enum SqlSource {
    Raw(RawSql),
    Dynamic(DynamicSql),
}

/// Precomputed form of a non-dynamic template.
#[derive(Debug, Clone)]
pub struct RawSql {
    pub sql: String,
    pub markers: Vec<ParameterMarker>,
}

/// Tree form of a dynamic template, walked per call.
#[derive(Debug, Clone)]
pub struct DynamicSql {
    pub root: SqlNode,
}

/// The product of rendering: final SQL with positional placeholders,
/// the ordered marker list, and the named bindings accumulated during
/// the walk (per-iteration names, `<bind>` results), which also feed
/// cache-key computation.
#[derive(Debug, Clone)]
pub struct BoundSql {
    pub sql: String,
    pub markers: Vec<ParameterMarker>,
    pub bindings: IndexMap<String, Value>,
}

impl SqlSource {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, SqlSource::Dynamic(_))
    }

    /// Renders the template against a parameter object.
    pub fn render(&self, parameter: &Value, guard: Option<&Regex>) -> Result<BoundSql> {
        match self {
            SqlSource::Raw(raw) => Ok(BoundSql {
                sql: raw.sql.clone(),
                markers: raw.markers.clone(),
                bindings: IndexMap::new(),
            }),
            SqlSource::Dynamic(dynamic) => {
                let mut ctx = RenderContext::new(parameter, guard);
                dynamic.root.apply(&mut ctx)?;
                let (text, bindings) = ctx.into_parts();

                let (sql, markers) = extract_markers(&text)?;
                trace!(sql = %sql, params = markers.len(), "rendered dynamic statement");

                Ok(BoundSql {
                    sql,
                    markers,
                    bindings,
                })
            }
        }
    }
}

/// Replaces every `#{...}` marker with a positional `?` placeholder,
/// collecting the parsed markers in left-to-right order.
pub(crate) fn extract_markers(sql: &str) -> Result<(String, Vec<ParameterMarker>)> {
    let mut markers = vec![];
    let sql = token::parse_tokens("#{", "}", sql, &mut |content| {
        markers.push(ParameterMarker::parse(content)?);
        Ok("?".to_string())
    })?;
    Ok((sql, markers))
}
