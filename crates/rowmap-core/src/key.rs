use crate::Value;

use std::hash::{Hash, Hasher};

/// An order-sensitive structural key.
///
/// Built by folding in components one at a time; two keys are equal iff
/// every folded component is equal, in order. Used both for
/// statement-level cache keys (statement id, bounds, SQL, bound values)
/// and for row identity during materialization.
///
/// A key with fewer than two folded components has no stable identity
/// and must never be used for deduplication; see [`CacheKey::is_degenerate`].
#[derive(Debug, Clone, Default)]
pub struct CacheKey {
    hash: u64,
    components: Vec<Value>,
}

impl CacheKey {
    pub fn new() -> CacheKey {
        CacheKey::default()
    }

    /// Folds one component into the key.
    pub fn update(&mut self, value: impl Into<Value>) {
        let value = value.into();

        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.hash.hash(&mut hasher);
        hash_value(&value, &mut hasher);
        self.hash = hasher.finish();

        self.components.push(value);
    }

    pub fn update_all<I>(&mut self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        for value in values {
            self.update(value);
        }
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Folds another key's components onto a copy of this one.
    ///
    /// Used for nested row identity, where the child's key must also
    /// carry the parent's so identical child rows under different
    /// parents stay distinct.
    pub fn combine(&self, parent: &CacheKey) -> CacheKey {
        let mut combined = self.clone();
        combined.update_all(parent.components.iter().cloned());
        combined
    }

    /// `true` when the key carries too few components to identify
    /// anything.
    pub fn is_degenerate(&self) -> bool {
        self.components.len() < 2
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &CacheKey) -> bool {
        self.hash == other.hash && self.components == other.components
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    // Each variant folds a discriminant tag first so that e.g. I32(1)
    // and I64(1) produce different folds.
    match value {
        Value::Null => state.write_u8(0),
        Value::Bool(v) => {
            state.write_u8(1);
            v.hash(state);
        }
        Value::I32(v) => {
            state.write_u8(2);
            v.hash(state);
        }
        Value::I64(v) => {
            state.write_u8(3);
            v.hash(state);
        }
        Value::F64(v) => {
            state.write_u8(4);
            v.to_bits().hash(state);
        }
        Value::String(v) => {
            state.write_u8(5);
            v.hash(state);
        }
        Value::List(items) => {
            state.write_u8(6);
            state.write_usize(items.len());
            for item in items {
                hash_value(item, state);
            }
        }
        Value::Map(map) => {
            state.write_u8(7);
            state.write_usize(map.len());
            for (key, item) in map {
                key.hash(state);
                hash_value(item, state);
            }
        }
        Value::Object(object) => {
            state.write_u8(8);
            for (key, item) in object.properties() {
                key.hash(state);
                hash_value(&item, state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_folds_are_equal() {
        let mut a = CacheKey::new();
        a.update("stmt");
        a.update(1i64);

        let mut b = CacheKey::new();
        b.update("stmt");
        b.update(1i64);

        assert_eq!(a, b);
        assert!(!a.is_degenerate());
    }

    #[test]
    fn order_is_significant() {
        let mut a = CacheKey::new();
        a.update(1i64);
        a.update(2i64);

        let mut b = CacheKey::new();
        b.update(2i64);
        b.update(1i64);

        assert_ne!(a, b);
    }

    #[test]
    fn variant_tag_disambiguates() {
        let mut a = CacheKey::new();
        a.update(Value::I32(1));
        a.update(Value::Null);

        let mut b = CacheKey::new();
        b.update(Value::I64(1));
        b.update(Value::Null);

        assert_ne!(a, b);
    }

    #[test]
    fn single_component_is_degenerate() {
        let mut key = CacheKey::new();
        key.update(42i64);
        assert!(key.is_degenerate());
    }
}
