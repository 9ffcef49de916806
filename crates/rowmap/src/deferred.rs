use crate::session::WeakSession;

use rowmap_core::{err, Object, Result, Value};
use std::sync::{Arc, Mutex};
use tracing::trace;

/// A property load that has been registered but not yet performed.
///
/// Eager entries are drained in registration order once the outermost
/// query completes; lazy entries wait for [`LazyRef::get`] or
/// [`crate::Session::load_pending`].
pub(crate) struct DeferredLoader {
    entries: Vec<DeferredEntry>,
}

pub(crate) struct DeferredEntry {
    pub(crate) lazy: bool,
    pub(crate) target: Object,
    pub(crate) property: String,
    pub(crate) lazy_ref: LazyRef,
}

impl DeferredLoader {
    pub(crate) fn register(&mut self, entry: DeferredEntry) {
        trace!(property = %entry.property, lazy = entry.lazy, "registered deferred load");
        self.entries.push(entry);
    }

    /// Removes and returns the first non-lazy entry, in registration
    /// order.
    pub(crate) fn pop_eager(&mut self) -> Option<DeferredEntry> {
        let index = self.entries.iter().position(|entry| !entry.lazy)?;
        Some(self.entries.remove(index))
    }

    /// Removes and returns every entry whose target is one of the
    /// given instances.
    pub(crate) fn take_for(&mut self, objects: &[Object]) -> Vec<DeferredEntry> {
        let mut taken = vec![];
        let mut index = 0;
        while index < self.entries.len() {
            if objects.iter().any(|o| o.ptr_eq(&self.entries[index].target)) {
                taken.push(self.entries.remove(index));
            } else {
                index += 1;
            }
        }
        taken
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drops every entry registered past the given queue length.
    pub(crate) fn discard_from(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// The lazy refs registered for one instance, without removing
    /// them.
    pub(crate) fn refs_for(&self, target: &Object) -> Vec<LazyRef> {
        self.entries
            .iter()
            .filter(|entry| entry.target.ptr_eq(target))
            .map(|entry| entry.lazy_ref.clone())
            .collect()
    }
}

impl Default for DeferredLoader {
    fn default() -> DeferredLoader {
        DeferredLoader { entries: vec![] }
    }
}

/// Handle to a deferred property: resolves on first access, delegates
/// to the stored value thereafter.
///
/// Resolution re-enters the query pipeline through the owning session,
/// so the internal lock is never held across the nested query; the
/// resulting race between two concurrent first accesses is benign
/// (both run the same statement, the property converges on one value).
#[derive(Clone)]
pub struct LazyRef {
    state: Arc<Mutex<LazyState>>,
}

enum LazyState {
    Pending(PendingLoad),
    Resolved(Value),
}

#[derive(Clone)]
pub(crate) struct PendingLoad {
    pub(crate) session: WeakSession,
    pub(crate) target: Object,
    pub(crate) property: String,
    pub(crate) statement: String,
    pub(crate) param: Value,
    pub(crate) many: bool,
}

impl LazyRef {
    pub(crate) fn new(pending: PendingLoad) -> LazyRef {
        LazyRef {
            state: Arc::new(Mutex::new(LazyState::Pending(pending))),
        }
    }

    /// Resolves the property if it has not been resolved yet, and
    /// returns its value.
    pub fn get(&self) -> Result<Value> {
        let pending = match &*self.state.lock().unwrap() {
            LazyState::Resolved(value) => return Ok(value.clone()),
            LazyState::Pending(pending) => pending.clone(),
        };

        let value = pending.execute()?;

        let mut state = self.state.lock().unwrap();
        if let LazyState::Resolved(value) = &*state {
            return Ok(value.clone());
        }
        pending.target.set(&pending.property, value.clone());
        *state = LazyState::Resolved(value.clone());
        Ok(value)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(&*self.state.lock().unwrap(), LazyState::Resolved(_))
    }
}

impl PendingLoad {
    fn execute(&self) -> Result<Value> {
        let Some(session) = self.session.upgrade() else {
            return Err(err!(
                "session dropped before property `{}` was loaded",
                self.property
            ));
        };

        trace!(statement = %self.statement, property = %self.property, "loading deferred property");

        if self.many {
            Ok(Value::List(
                session.select_list(&self.statement, &self.param)?,
            ))
        } else {
            Ok(session
                .select_one(&self.statement, &self.param)?
                .unwrap_or(Value::Null))
        }
    }
}
