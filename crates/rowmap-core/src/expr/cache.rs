use super::Expr;
use crate::Result;

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

// Compiled expressions are pure, so a racing recompute on a cache miss
// is benign; hits read through without write locking.
static CACHE: Lazy<RwLock<HashMap<String, Arc<Expr>>>> = Lazy::new(|| RwLock::new(HashMap::new()));

impl Expr {
    /// Parses through the shared compile cache.
    pub fn compile(src: &str) -> Result<Arc<Expr>> {
        if let Some(expr) = CACHE.read().unwrap().get(src) {
            return Ok(expr.clone());
        }

        let expr = Arc::new(Expr::parse(src)?);
        CACHE
            .write()
            .unwrap()
            .insert(src.to_string(), expr.clone());
        Ok(expr)
    }
}
