mod object;
pub use object::Object;

use crate::{path::Step, ty::Type, Path, Result};

use indexmap::IndexMap;

/// A dynamic value: a scalar, a list, a map, or a materialized object.
///
/// Parameter objects handed to the engine and object graphs produced by
/// the materializer are both expressed as `Value` trees. `Object` is a
/// shared handle so that one-to-many merging and deferred loading can
/// mutate an instance after it has been published into a result row.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// Null value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Signed 32-bit integer
    I32(i32),

    /// Signed 64-bit integer
    I64(i64),

    /// 64-bit floating point
    F64(f64),

    /// String value
    String(String),

    /// A list of values
    List(Vec<Value>),

    /// An anonymous map of named values
    Map(IndexMap<String, Value>),

    /// A typed object with shared-handle semantics
    Object(Object),
}

impl Value {
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Boolean interpretation used by conditional template nodes.
    ///
    /// Non-zero numeric values are true; null is false; a string is
    /// true when non-empty; lists and maps are true when non-empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(v) => *v,
            Self::I32(v) => *v != 0,
            Self::I64(v) => *v != 0,
            Self::F64(v) => *v != 0.0,
            Self::String(v) => !v.is_empty(),
            Self::List(v) => !v.is_empty(),
            Self::Map(v) => !v.is_empty(),
            Self::Object(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I32(v) => Some(*v as i64),
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn to_bool(self) -> Result<bool> {
        match self {
            Self::Bool(v) => Ok(v),
            other => Err(crate::Error::type_conversion(other.type_name(), "bool")),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(v) => v.to_string(),
            Self::I32(v) => v.to_string(),
            Self::I64(v) => v.to_string(),
            Self::F64(v) => v.to_string(),
            Self::String(v) => v.clone(),
            other => format!("{other:?}"),
        }
    }

    /// A short name for the value's runtime shape, used in error
    /// messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::F64(_) => "f64",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
        }
    }

    pub fn infer_ty(&self) -> Type {
        match self {
            Self::Null => Type::Unknown,
            Self::Bool(_) => Type::Bool,
            Self::I32(_) => Type::I32,
            Self::I64(_) => Type::I64,
            Self::F64(_) => Type::F64,
            Self::String(_) => Type::String,
            Self::List(_) => Type::List,
            Self::Map(_) => Type::Map,
            Self::Object(object) => match object.type_name() {
                Some(name) => Type::Object(name),
                None => Type::Map,
            },
        }
    }

    /// Resolves a property path against this value.
    ///
    /// Missing intermediate steps resolve to `Null`.
    pub fn get_path(&self, path: &Path) -> Value {
        let mut current = self.clone();

        for step in path.steps() {
            current = match (&current, step) {
                (Value::Map(map), Step::Prop(name)) => {
                    map.get(name.as_str()).cloned().unwrap_or(Value::Null)
                }
                (Value::Object(object), Step::Prop(name)) => object.get(name),
                (Value::List(items), Step::Index(index)) => {
                    items.get(*index).cloned().unwrap_or(Value::Null)
                }
                _ => Value::Null,
            };
        }

        current
    }

    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

impl From<bool> for Value {
    fn from(src: bool) -> Self {
        Self::Bool(src)
    }
}

impl From<i32> for Value {
    fn from(src: i32) -> Self {
        Self::I32(src)
    }
}

impl From<i64> for Value {
    fn from(src: i64) -> Self {
        Self::I64(src)
    }
}

impl From<f64> for Value {
    fn from(src: f64) -> Self {
        Self::F64(src)
    }
}

impl From<String> for Value {
    fn from(src: String) -> Self {
        Self::String(src)
    }
}

impl From<&str> for Value {
    fn from(src: &str) -> Self {
        Self::String(src.to_string())
    }
}

impl From<Object> for Value {
    fn from(src: Object) -> Self {
        Self::Object(src)
    }
}

impl<T> From<Vec<T>> for Value
where
    Self: From<T>,
{
    fn from(src: Vec<T>) -> Self {
        Self::List(src.into_iter().map(Self::from).collect())
    }
}

impl<T> From<Option<T>> for Value
where
    Self: From<T>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::from(value),
            None => Self::Null,
        }
    }
}

impl FromIterator<(String, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().collect())
    }
}
