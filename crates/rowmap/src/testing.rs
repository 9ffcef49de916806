//! In-memory execution collaborators for tests: a canned-row cursor
//! and an executor that serves statements from pre-loaded tables while
//! recording every call it sees.

use crate::cursor::{ColumnInfo, ResultCursor};
use crate::executor::{BoundStatement, Executor};

use rowmap_core::{err, Result, StoreType, Type, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// Cursor over rows held in memory.
pub struct MemoryCursor {
    columns: Vec<ColumnInfo>,
    rows: Vec<Vec<Value>>,

    /// 0 = before the first row; row `n` is current when `pos == n + 1`.
    pos: usize,
    seekable: bool,
}

impl MemoryCursor {
    pub fn new(columns: Vec<ColumnInfo>, rows: Vec<Vec<Value>>) -> MemoryCursor {
        MemoryCursor {
            columns,
            rows,
            pos: 0,
            seekable: true,
        }
    }

    /// Disables absolute positioning, forcing sequential skips.
    pub fn forward_only(mut self) -> MemoryCursor {
        self.seekable = false;
        self
    }
}

impl ResultCursor for MemoryCursor {
    fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    fn advance(&mut self) -> Result<bool> {
        if self.pos < self.rows.len() {
            self.pos += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn get(&self, index: usize, _ty: &Type) -> Result<Value> {
        let row = self
            .rows
            .get(self.pos.wrapping_sub(1))
            .ok_or_else(|| err!("cursor is not positioned on a row"))?;
        row.get(index)
            .cloned()
            .ok_or_else(|| err!("column index {index} out of range"))
    }

    fn supports_absolute(&self) -> bool {
        self.seekable
    }

    fn absolute(&mut self, row: usize) -> Result<bool> {
        if !self.seekable {
            return Err(err!("cursor does not support absolute positioning"));
        }
        self.pos = row.min(self.rows.len());
        Ok(self.pos < self.rows.len())
    }
}

struct Table {
    columns: Vec<ColumnInfo>,
    rows: Vec<Vec<Value>>,
}

/// Executor serving canned result sets keyed by statement id.
#[derive(Default)]
pub struct StubExecutor {
    tables: Mutex<HashMap<String, Table>>,
    updates: Mutex<HashMap<String, u64>>,
    calls: Mutex<Vec<BoundStatement>>,
    forward_only: bool,
}

impl StubExecutor {
    pub fn new() -> StubExecutor {
        StubExecutor::default()
    }

    /// Serves only forward-only cursors.
    pub fn forward_only(mut self) -> StubExecutor {
        self.forward_only = true;
        self
    }

    /// Registers the rows a statement id returns.
    pub fn on_query(&self, id: &str, columns: &[(&str, StoreType)], rows: Vec<Vec<Value>>) {
        let columns = columns
            .iter()
            .map(|(name, store_ty)| ColumnInfo::new(*name, *store_ty))
            .collect();
        self.tables
            .lock()
            .unwrap()
            .insert(id.to_string(), Table { columns, rows });
    }

    /// Registers the affected-row count a write statement reports.
    pub fn on_update(&self, id: &str, affected: u64) {
        self.updates.lock().unwrap().insert(id.to_string(), affected);
    }

    /// Every statement executed so far, in order.
    pub fn calls(&self) -> Vec<BoundStatement> {
        self.calls.lock().unwrap().clone()
    }

    /// How many times one statement id was executed.
    pub fn query_count(&self, id: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.id == id)
            .count()
    }
}

impl Executor for StubExecutor {
    fn query(&self, statement: &BoundStatement) -> Result<Box<dyn ResultCursor>> {
        self.calls.lock().unwrap().push(statement.clone());

        let tables = self.tables.lock().unwrap();
        let Some(table) = tables.get(&statement.id) else {
            return Err(err!("no canned rows for statement `{}`", statement.id));
        };

        let mut cursor = MemoryCursor::new(table.columns.clone(), table.rows.clone());
        if self.forward_only {
            cursor = cursor.forward_only();
        }
        Ok(Box::new(cursor))
    }

    fn update(&self, statement: &BoundStatement) -> Result<u64> {
        self.calls.lock().unwrap().push(statement.clone());
        Ok(self
            .updates
            .lock()
            .unwrap()
            .get(&statement.id)
            .copied()
            .unwrap_or(1))
    }
}
