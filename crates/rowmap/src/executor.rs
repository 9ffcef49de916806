use crate::cursor::{ResultCursor, RowBounds};

use indexmap::IndexMap;
use rowmap_core::{CacheKey, Result, Value};
use rowmap_template::BoundParam;

/// A fully rendered statement, ready to hand to an [`Executor`].
///
/// Carries the final SQL with positional placeholders, the ordered
/// parameter list matching them, and the named bindings accumulated
/// during rendering (used for cache-key computation).
#[derive(Debug, Clone)]
pub struct BoundStatement {
    pub id: String,
    pub sql: String,
    pub params: Vec<BoundParam>,
    pub bindings: IndexMap<String, Value>,
}

impl BoundStatement {
    /// The statement-level cache key: statement id, bounds, SQL text,
    /// then every bound value in order.
    pub fn cache_key(&self, bounds: RowBounds) -> CacheKey {
        let mut key = CacheKey::new();
        key.update(self.id.as_str());
        key.update(bounds.offset as i64);
        key.update(if bounds.limit == usize::MAX {
            -1i64
        } else {
            bounds.limit as i64
        });
        key.update(self.sql.as_str());
        for param in &self.params {
            key.update(param.value.clone());
        }
        key
    }
}

/// The external execution collaborator.
///
/// The engine renders and binds; an executor runs the statement
/// against whatever store backs it and hands back a cursor (for
/// queries) or an affected-row count (for writes).
pub trait Executor: Send + Sync {
    fn query(&self, stmt: &BoundStatement) -> Result<Box<dyn ResultCursor>>;

    fn update(&self, stmt: &BoundStatement) -> Result<u64>;
}
