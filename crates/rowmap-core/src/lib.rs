mod error;
pub use error::Error;

pub mod expr;
pub use expr::Expr;

pub mod key;
pub use key::CacheKey;

pub mod path;
pub use path::Path;

pub mod ty;
pub use ty::{StoreType, Type};

pub mod value;
pub use value::{Object, Value};

/// A Result type alias that uses rowmap's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
