use rowmap_core::{err, Result, StoreType, Type, Value};

/// Name and store type of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub store_ty: StoreType,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, store_ty: StoreType) -> ColumnInfo {
        ColumnInfo {
            name: name.into(),
            store_ty,
        }
    }
}

/// Tabular cursor over a query result, supplied by the execution
/// collaborator.
///
/// The cursor starts positioned before the first row; `advance` moves
/// to the next row and reports whether one is available. `absolute(n)`
/// repositions before row `n` (0-based) when the underlying cursor
/// supports non-forward-only positioning.
pub trait ResultCursor {
    fn columns(&self) -> &[ColumnInfo];

    fn advance(&mut self) -> Result<bool>;

    /// Reads the current row's value at `index` under the requested
    /// declared type.
    fn get(&self, index: usize, ty: &Type) -> Result<Value>;

    fn supports_absolute(&self) -> bool {
        false
    }

    fn absolute(&mut self, row: usize) -> Result<bool> {
        let _ = row;
        Err(err!("cursor does not support absolute positioning"))
    }
}

/// A bounded window over a result set.
///
/// The default bounds select everything. Skipping the offset uses
/// `absolute` when the cursor supports it, sequential advancing
/// otherwise; either way the materialized output is the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBounds {
    pub offset: usize,
    pub limit: usize,
}

impl RowBounds {
    pub fn new(offset: usize, limit: usize) -> RowBounds {
        RowBounds { offset, limit }
    }
}

impl Default for RowBounds {
    fn default() -> RowBounds {
        RowBounds {
            offset: 0,
            limit: usize::MAX,
        }
    }
}
