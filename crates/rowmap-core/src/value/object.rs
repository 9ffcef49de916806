use super::Value;

use indexmap::IndexMap;
use std::cell::RefCell;
use std::sync::{Arc, Mutex};

/// A materialized object: an ordered set of named properties plus an
/// optional type name.
///
/// `Object` is a shared handle; cloning clones the handle, not the
/// data. The materializer relies on this to merge later cursor rows
/// into an instance that has already been placed into the output, and
/// the deferred loader relies on it to fill a property after the
/// owning query has completed. [`Object::ptr_eq`] is the reference
/// equality the row-identity deduplication guarantee is stated in.
#[derive(Clone)]
pub struct Object {
    data: Arc<Mutex<ObjectData>>,
}

#[derive(Debug, Default)]
struct ObjectData {
    type_name: Option<String>,
    props: IndexMap<String, Value>,
}

impl Object {
    pub fn new(type_name: Option<&str>) -> Object {
        Object {
            data: Arc::new(Mutex::new(ObjectData {
                type_name: type_name.map(str::to_string),
                props: IndexMap::new(),
            })),
        }
    }

    pub fn type_name(&self) -> Option<String> {
        self.data.lock().unwrap().type_name.clone()
    }

    /// Returns the property value, or `Null` when unset.
    pub fn get(&self, name: &str) -> Value {
        self.data
            .lock()
            .unwrap()
            .props
            .get(name)
            .cloned()
            .unwrap_or(Value::Null)
    }

    pub fn set(&self, name: &str, value: impl Into<Value>) {
        self.data
            .lock()
            .unwrap()
            .props
            .insert(name.to_string(), value.into());
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.data.lock().unwrap().props.contains_key(name)
    }

    /// Appends to a list-valued property, creating the list on first
    /// use.
    pub fn push(&self, name: &str, value: impl Into<Value>) {
        let mut data = self.data.lock().unwrap();
        match data.props.get_mut(name) {
            Some(Value::List(items)) => items.push(value.into()),
            _ => {
                data.props
                    .insert(name.to_string(), Value::List(vec![value.into()]));
            }
        }
    }

    /// Snapshot of the property names in declaration order.
    pub fn property_names(&self) -> Vec<String> {
        self.data.lock().unwrap().props.keys().cloned().collect()
    }

    /// Snapshot of the properties in declaration order.
    pub fn properties(&self) -> Vec<(String, Value)> {
        self.data
            .lock()
            .unwrap()
            .props
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Returns `true` when both handles refer to the same instance.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl Default for Object {
    fn default() -> Object {
        Object::new(None)
    }
}

impl PartialEq for Object {
    /// Structural equality over cyclic graphs: a handle pair already
    /// being compared further up the stack is taken as equal, so the
    /// recursion terminates. Each side is snapshotted before the
    /// property walk, so no mutex is held across it.
    fn eq(&self, other: &Object) -> bool {
        if self.ptr_eq(other) {
            return true;
        }

        let pair = (
            Arc::as_ptr(&self.data) as usize,
            Arc::as_ptr(&other.data) as usize,
        );
        let entered = IN_COMPARISON.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(&pair) {
                return false;
            }
            stack.push(pair);
            true
        });
        if !entered {
            return true;
        }

        let lhs = snapshot(self);
        let rhs = snapshot(other);
        let equal = lhs == rhs;

        IN_COMPARISON.with(|stack| {
            stack.borrow_mut().pop();
        });
        equal
    }
}

thread_local! {
    static IN_COMPARISON: RefCell<Vec<(usize, usize)>> = RefCell::new(Vec::new());
}

fn snapshot(object: &Object) -> (Option<String>, IndexMap<String, Value>) {
    let data = object.data.lock().unwrap();
    (data.type_name.clone(), data.props.clone())
}

impl core::fmt::Debug for Object {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let data = self.data.lock().unwrap();
        let mut s = f.debug_struct(data.type_name.as_deref().unwrap_or("Object"));
        for (name, value) in &data.props {
            s.field(name, value);
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_graphs_compare_without_hanging() {
        let a = Object::new(Some("Node"));
        let b = Object::new(Some("Node"));
        a.set("peer", b.clone());
        b.set("peer", a.clone());

        let a2 = Object::new(Some("Node"));
        let b2 = Object::new(Some("Node"));
        a2.set("peer", b2.clone());
        b2.set("peer", a2.clone());

        assert_eq!(a, a2);

        b2.set("tag", Value::from("extra"));
        assert_ne!(a, a2);
    }

    #[test]
    fn self_referential_object_equals_itself() {
        let a = Object::new(Some("Node"));
        a.set("this", a.clone());
        assert_eq!(a, a.clone());
    }
}
