pub mod convert;
pub use convert::Converter;

pub mod cursor;
pub use cursor::{ColumnInfo, ResultCursor, RowBounds};

mod deferred;
pub use deferred::LazyRef;

pub mod executor;
pub use executor::{BoundStatement, Executor};

pub mod mapping;
pub use mapping::{AutoMapping, ColumnRef, Discriminator, FieldBinding, ResultMap, ResultMapBuilder};

mod materialize;

mod registry;
pub use registry::{Registry, Settings};

mod session;
pub use session::Session;

mod statement;
pub use statement::{MappedStatement, StatementBuilder, StatementKind};

pub mod testing;

mod types;
pub use types::{Constructor, TypeDescriptor};

pub use rowmap_core::{Error, Object, Result, StoreType, Type, Value};
