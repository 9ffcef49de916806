use indexmap::IndexMap;
use regex::Regex;
use rowmap_core::{expr::EvalContext, Result, Value};

/// Per-call evaluation state for one walk of a dynamic node tree.
///
/// Owns the growing SQL buffer, the accumulated named bindings
/// (including internal per-iteration names produced by loop nodes),
/// and the unique-number counter used to disambiguate them. One
/// context per render; never shared.
pub struct RenderContext<'a> {
    parameter: &'a Value,
    guard: Option<&'a Regex>,
    sql: String,
    bindings: IndexMap<String, Value>,
    unique: u32,
}

impl<'a> RenderContext<'a> {
    pub fn new(parameter: &'a Value, guard: Option<&'a Regex>) -> RenderContext<'a> {
        RenderContext {
            parameter,
            guard,
            sql: String::new(),
            bindings: IndexMap::new(),
            unique: 0,
        }
    }

    /// The expression context for the current binding state.
    pub fn eval_cx(&self) -> EvalContext<'_> {
        EvalContext::with_bindings(self.parameter, &self.bindings)
    }

    /// Appends one fragment, space-separated from the previous one.
    pub fn append_sql(&mut self, fragment: &str) {
        if !fragment.is_empty() {
            self.sql.push_str(fragment);
            self.sql.push(' ');
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn bind(&mut self, name: &str, value: Value) {
        self.bindings.insert(name.to_string(), value);
    }

    pub fn remove_binding(&mut self, name: &str) {
        self.bindings.shift_remove(name);
    }

    pub fn next_unique(&mut self) -> u32 {
        let n = self.unique;
        self.unique += 1;
        n
    }

    pub(crate) fn guard(&self) -> Option<&Regex> {
        self.guard
    }

    /// Runs `f` with an empty SQL buffer and hands back what it
    /// produced, restoring the surrounding buffer afterwards. Bindings
    /// and the unique counter carry through.
    pub(crate) fn capture(
        &mut self,
        f: impl FnOnce(&mut RenderContext<'a>) -> Result<bool>,
    ) -> Result<(String, bool)> {
        let saved = std::mem::take(&mut self.sql);
        let result = f(self);
        let body = std::mem::replace(&mut self.sql, saved);
        Ok((body, result?))
    }

    pub fn into_parts(self) -> (String, IndexMap<String, Value>) {
        (self.sql.trim().to_string(), self.bindings)
    }
}
