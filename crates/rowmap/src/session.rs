use crate::cursor::RowBounds;
use crate::deferred::{DeferredEntry, DeferredLoader, LazyRef, PendingLoad};
use crate::executor::{BoundStatement, Executor};
use crate::materialize::Materializer;
use crate::registry::Registry;
use crate::statement::{MappedStatement, StatementKind};

use rowmap_core::{bail, err, Object, Result, Value};
use rowmap_template::bind_parameters;
use std::sync::{Arc, Mutex, Weak};
use tracing::debug;

struct Shared {
    registry: Arc<Registry>,
    executor: Arc<dyn Executor>,
    state: Mutex<ExecState>,
}

#[derive(Default)]
struct ExecState {
    /// Nesting depth of in-flight executions. Nested selects issued
    /// during materialization recurse through the same session; the
    /// deferred queue drains only when this returns to zero.
    depth: usize,

    /// Deferred-queue length when the outermost execution began. A
    /// failing execution truncates the queue back to this, so its
    /// loads are never drained by a later call.
    checkpoint: usize,

    deferred: DeferredLoader,
}

/// The execution facade: renders, binds, runs statements through the
/// executor, and materializes results.
///
/// Cloning is cheap; clones share the registry, the executor and the
/// deferred-load queue.
#[derive(Clone)]
pub struct Session {
    shared: Arc<Shared>,
}

#[derive(Clone)]
pub(crate) struct WeakSession {
    shared: Weak<Shared>,
}

impl WeakSession {
    pub(crate) fn upgrade(&self) -> Option<Session> {
        self.shared.upgrade().map(|shared| Session { shared })
    }
}

impl Session {
    pub fn new(registry: Arc<Registry>, executor: Arc<dyn Executor>) -> Session {
        Session {
            shared: Arc::new(Shared {
                registry,
                executor,
                state: Mutex::new(ExecState::default()),
            }),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.shared.registry
    }

    pub(crate) fn downgrade(&self) -> WeakSession {
        WeakSession {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Renders and binds a statement without executing it.
    pub fn render(&self, id: &str, param: &Value) -> Result<BoundStatement> {
        let stmt = self.shared.registry.statement(id)?;
        let guard = self.shared.registry.settings().substitution_guard.as_ref();

        let bound = stmt.source.render(param, guard)?;
        let params = bind_parameters(&bound, param)?;
        debug!(statement = id, params = params.len(), "bound statement");

        Ok(BoundStatement {
            id: id.to_string(),
            sql: bound.sql,
            params,
            bindings: bound.bindings,
        })
    }

    pub fn select_list(&self, id: &str, param: &Value) -> Result<Vec<Value>> {
        self.select_list_bounded(id, param, RowBounds::default())
    }

    pub fn select_list_bounded(
        &self,
        id: &str,
        param: &Value,
        bounds: RowBounds,
    ) -> Result<Vec<Value>> {
        let stmt = self.shared.registry.statement(id)?.clone();
        if stmt.kind != StatementKind::Select {
            bail!("statement `{id}` is not a select statement");
        }
        let bound = self.render(id, param)?;

        self.enter();
        let result = self.run_select(&stmt, &bound, bounds);
        let outermost = self.exit();

        match result {
            Ok(rows) => {
                if outermost {
                    self.drain_eager()?;
                }
                Ok(rows)
            }
            Err(err) => {
                if outermost {
                    self.discard_deferred();
                }
                Err(err)
            }
        }
    }

    fn run_select(
        &self,
        stmt: &MappedStatement,
        bound: &BoundStatement,
        bounds: RowBounds,
    ) -> Result<Vec<Value>> {
        let cursor = self.shared.executor.query(bound)?;
        let map = match stmt.primary_result_map() {
            Some(map_id) => Some(self.shared.registry.result_map(map_id)?.clone()),
            None => None,
        };
        Materializer::new(self).run(cursor, map, bounds)
    }

    /// Runs a select expected to produce at most one row.
    pub fn select_one(&self, id: &str, param: &Value) -> Result<Option<Value>> {
        let mut rows = self.select_list(id, param)?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            n => Err(err!("statement `{id}` returned {n} rows, expected at most one")),
        }
    }

    pub fn insert(&self, id: &str, param: &Value) -> Result<u64> {
        self.execute_write(id, param, StatementKind::Insert)
    }

    pub fn update(&self, id: &str, param: &Value) -> Result<u64> {
        self.execute_write(id, param, StatementKind::Update)
    }

    pub fn delete(&self, id: &str, param: &Value) -> Result<u64> {
        self.execute_write(id, param, StatementKind::Delete)
    }

    fn execute_write(&self, id: &str, param: &Value, kind: StatementKind) -> Result<u64> {
        let stmt = self.shared.registry.statement(id)?.clone();
        if stmt.kind != kind {
            bail!("statement `{id}` is not {kind:?}");
        }
        let bound = self.render(id, param)?;
        let affected = self.shared.executor.update(&bound)?;
        debug!(statement = id, affected, "executed write");
        Ok(affected)
    }

    /// Resolves every deferred load registered for an instance
    /// reachable from `value`.
    pub fn load_pending(&self, value: &Value) -> Result<()> {
        let mut objects = vec![];
        collect_objects(value, &mut objects);

        let entries = self
            .shared
            .state
            .lock()
            .unwrap()
            .deferred
            .take_for(&objects);
        debug!(count = entries.len(), "resolving pending loads");

        for entry in entries {
            entry.lazy_ref.get()?;
        }
        Ok(())
    }

    /// The unresolved deferred loads registered for one instance.
    pub fn pending(&self, target: &Object) -> Vec<LazyRef> {
        self.shared
            .state
            .lock()
            .unwrap()
            .deferred
            .refs_for(target)
    }

    pub(crate) fn defer(
        &self,
        target: Object,
        property: &str,
        statement: &str,
        param: Value,
        many: bool,
        lazy: bool,
    ) {
        let lazy_ref = LazyRef::new(PendingLoad {
            session: self.downgrade(),
            target: target.clone(),
            property: property.to_string(),
            statement: statement.to_string(),
            param,
            many,
        });
        self.shared
            .state
            .lock()
            .unwrap()
            .deferred
            .register(DeferredEntry {
                lazy,
                target,
                property: property.to_string(),
                lazy_ref,
            });
    }

    fn enter(&self) {
        let mut state = self.shared.state.lock().unwrap();
        if state.depth == 0 {
            state.checkpoint = state.deferred.len();
        }
        state.depth += 1;
    }

    /// Decrements the nesting depth; `true` when the outermost
    /// execution just completed.
    fn exit(&self) -> bool {
        let mut state = self.shared.state.lock().unwrap();
        state.depth -= 1;
        state.depth == 0
    }

    /// Drops everything a failed outermost execution queued: its
    /// targets were never handed to the caller.
    fn discard_deferred(&self) {
        let mut state = self.shared.state.lock().unwrap();
        let checkpoint = state.checkpoint;
        state.deferred.discard_from(checkpoint);
    }

    /// Runs queued non-lazy loads in registration order. The lock is
    /// released around each load, which re-enters the pipeline.
    fn drain_eager(&self) -> Result<()> {
        loop {
            let entry = self.shared.state.lock().unwrap().deferred.pop_eager();
            let Some(entry) = entry else {
                return Ok(());
            };
            entry.lazy_ref.get()?;
        }
    }
}

/// Collects every instance reachable from a value, cycle-safe.
fn collect_objects(value: &Value, into: &mut Vec<Object>) {
    match value {
        Value::Object(object) => {
            if into.iter().any(|o| o.ptr_eq(object)) {
                return;
            }
            into.push(object.clone());
            for (_, prop) in object.properties() {
                collect_objects(&prop, into);
            }
        }
        Value::List(items) => {
            for item in items {
                collect_objects(item, into);
            }
        }
        Value::Map(map) => {
            for item in map.values() {
                collect_objects(item, into);
            }
        }
        _ => {}
    }
}
