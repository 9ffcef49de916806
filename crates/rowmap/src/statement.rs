use rowmap_core::Type;
use rowmap_template::SqlSource;

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Flush,
}

/// One registered statement: a compiled template plus its execution
/// metadata. Built once at configuration time, shared read-only.
#[derive(Debug, Clone)]
pub struct MappedStatement {
    pub id: String,
    pub kind: StatementKind,
    pub source: SqlSource,

    /// Declared parameter type; `Unknown` accepts anything.
    pub parameter_ty: Type,

    /// Result map ids, normally one. The first is the one applied.
    pub result_maps: Vec<String>,

    pub fetch_size: Option<u32>,
    pub timeout: Option<Duration>,
    pub use_cache: bool,
}

impl MappedStatement {
    pub fn builder(id: &str, kind: StatementKind) -> StatementBuilder {
        StatementBuilder {
            id: id.to_string(),
            kind,
            template: String::new(),
            parameter_ty: Type::Unknown,
            result_maps: vec![],
            fetch_size: None,
            timeout: None,
            use_cache: false,
        }
    }

    pub(crate) fn primary_result_map(&self) -> Option<&str> {
        self.result_maps.first().map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct StatementBuilder {
    pub(crate) id: String,
    pub(crate) kind: StatementKind,
    pub(crate) template: String,
    parameter_ty: Type,
    result_maps: Vec<String>,
    fetch_size: Option<u32>,
    timeout: Option<Duration>,
    use_cache: bool,
}

impl StatementBuilder {
    pub fn template(mut self, text: &str) -> StatementBuilder {
        self.template = text.to_string();
        self
    }

    pub fn parameter_ty(mut self, ty: Type) -> StatementBuilder {
        self.parameter_ty = ty;
        self
    }

    pub fn result_map(mut self, id: &str) -> StatementBuilder {
        self.result_maps.push(id.to_string());
        self
    }

    pub fn fetch_size(mut self, rows: u32) -> StatementBuilder {
        self.fetch_size = Some(rows);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> StatementBuilder {
        self.timeout = Some(timeout);
        self
    }

    pub fn use_cache(mut self, use_cache: bool) -> StatementBuilder {
        self.use_cache = use_cache;
        self
    }

    pub(crate) fn build(self, source: SqlSource) -> MappedStatement {
        MappedStatement {
            id: self.id,
            kind: self.kind,
            source,
            parameter_ty: self.parameter_ty,
            result_maps: self.result_maps,
            fetch_size: self.fetch_size,
            timeout: self.timeout,
            use_cache: self.use_cache,
        }
    }
}
