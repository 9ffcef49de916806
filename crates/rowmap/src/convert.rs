use rowmap_core::{Error, Result, StoreType, Type, Value};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Converts store-side values into declared host types.
pub trait Converter: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn from_store(&self, value: Value, ty: &Type) -> Result<Value>;
}

/// Converter lookup keyed by (declared type, store type), with an
/// unknown-type fallback that defers the conversion decision to first
/// use.
#[derive(Debug)]
pub struct ConverterRegistry {
    by_key: HashMap<(Type, StoreType), Arc<dyn Converter>>,
    by_name: HashMap<String, Arc<dyn Converter>>,
    fallback: Arc<dyn Converter>,
}

impl ConverterRegistry {
    /// A registry pre-populated with the scalar built-ins.
    pub fn with_builtins() -> ConverterRegistry {
        let mut registry = ConverterRegistry {
            by_key: HashMap::new(),
            by_name: HashMap::new(),
            fallback: Arc::new(UnknownConverter),
        };

        let scalar: Arc<dyn Converter> = Arc::new(ScalarConverter);
        for ty in [Type::Bool, Type::I32, Type::I64, Type::F64, Type::String] {
            for store_ty in [
                StoreType::Boolean,
                StoreType::Integer,
                StoreType::BigInt,
                StoreType::Double,
                StoreType::Varchar,
                StoreType::Timestamp,
                StoreType::Other,
            ] {
                registry.by_key.insert((ty.clone(), store_ty), scalar.clone());
            }
        }
        registry
            .by_name
            .insert(scalar.name().to_string(), scalar.clone());

        registry
    }

    pub fn register(&mut self, ty: Type, store_ty: StoreType, converter: Arc<dyn Converter>) {
        self.by_name
            .insert(converter.name().to_string(), converter.clone());
        self.by_key.insert((ty, store_ty), converter);
    }

    /// Exact-match lookup; drives constructor signature matching.
    pub fn find(&self, ty: &Type, store_ty: StoreType) -> Option<&Arc<dyn Converter>> {
        self.by_key.get(&(ty.clone(), store_ty))
    }

    /// Lookup with the unknown-type fallback.
    pub fn resolve(&self, ty: &Type, store_ty: StoreType) -> Arc<dyn Converter> {
        self.find(ty, store_ty)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    pub fn by_name(&self, name: &str) -> Option<Arc<dyn Converter>> {
        self.by_name.get(name).cloned()
    }
}

impl Default for ConverterRegistry {
    fn default() -> ConverterRegistry {
        ConverterRegistry::with_builtins()
    }
}

/// Built-in conversion between the scalar store values and the scalar
/// declared types. Null passes through unconditionally.
#[derive(Debug)]
struct ScalarConverter;

impl Converter for ScalarConverter {
    fn name(&self) -> &str {
        "scalar"
    }

    fn from_store(&self, value: Value, ty: &Type) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        match ty {
            Type::Bool => match &value {
                Value::Bool(_) => Ok(value),
                Value::I32(v) => Ok(Value::Bool(*v != 0)),
                Value::I64(v) => Ok(Value::Bool(*v != 0)),
                Value::String(v) => match v.as_str() {
                    "true" | "1" => Ok(Value::Bool(true)),
                    "false" | "0" => Ok(Value::Bool(false)),
                    _ => Err(conversion_failed(&value, ty)),
                },
                _ => Err(conversion_failed(&value, ty)),
            },
            Type::I32 => match &value {
                Value::I32(_) => Ok(value),
                Value::I64(v) => i32::try_from(*v)
                    .map(Value::I32)
                    .map_err(|_| conversion_failed(&value, ty)),
                Value::String(v) => v
                    .parse()
                    .map(Value::I32)
                    .map_err(|_| conversion_failed(&value, ty)),
                _ => Err(conversion_failed(&value, ty)),
            },
            Type::I64 => match &value {
                Value::I32(v) => Ok(Value::I64(*v as i64)),
                Value::I64(_) => Ok(value),
                Value::String(v) => v
                    .parse()
                    .map(Value::I64)
                    .map_err(|_| conversion_failed(&value, ty)),
                _ => Err(conversion_failed(&value, ty)),
            },
            Type::F64 => match &value {
                Value::F64(_) => Ok(value),
                Value::I32(v) => Ok(Value::F64(*v as f64)),
                Value::I64(v) => Ok(Value::F64(*v as f64)),
                Value::String(v) => v
                    .parse()
                    .map(Value::F64)
                    .map_err(|_| conversion_failed(&value, ty)),
                _ => Err(conversion_failed(&value, ty)),
            },
            Type::String => match &value {
                Value::String(_) => Ok(value),
                Value::List(_) | Value::Map(_) | Value::Object(_) => {
                    Err(conversion_failed(&value, ty))
                }
                other => Ok(Value::String(other.to_text())),
            },
            _ => Ok(value),
        }
    }
}

fn conversion_failed(value: &Value, ty: &Type) -> Error {
    Error::type_conversion(value.type_name(), ty.to_string())
}

/// Fallback for undeclared types: hands the store value through
/// untouched, deferring the decision to whoever reads the property.
#[derive(Debug)]
struct UnknownConverter;

impl Converter for UnknownConverter {
    fn name(&self) -> &str {
        "unknown"
    }

    fn from_store(&self, value: Value, _ty: &Type) -> Result<Value> {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_passes_through() {
        let registry = ConverterRegistry::with_builtins();
        let converter = registry.resolve(&Type::I64, StoreType::BigInt);
        assert_eq!(
            converter.from_store(Value::Null, &Type::I64).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn string_column_to_i64() {
        let registry = ConverterRegistry::with_builtins();
        let converter = registry.resolve(&Type::I64, StoreType::Varchar);
        assert_eq!(
            converter
                .from_store(Value::from("42"), &Type::I64)
                .unwrap(),
            Value::I64(42)
        );
    }

    #[test]
    fn incompatible_value_is_an_error() {
        let registry = ConverterRegistry::with_builtins();
        let converter = registry.resolve(&Type::Bool, StoreType::Varchar);
        let err = converter
            .from_store(Value::from("maybe"), &Type::Bool)
            .unwrap_err();
        assert!(err.is_type_conversion());
    }

    #[test]
    fn unknown_type_falls_back_to_pass_through() {
        let registry = ConverterRegistry::with_builtins();
        let converter = registry.resolve(&Type::Unknown, StoreType::Varchar);
        assert_eq!(
            converter
                .from_store(Value::from("as-is"), &Type::Unknown)
                .unwrap(),
            Value::from("as-is")
        );
    }

    #[test]
    fn find_is_exact() {
        let registry = ConverterRegistry::with_builtins();
        assert!(registry.find(&Type::I64, StoreType::BigInt).is_some());
        assert!(registry
            .find(&Type::Object("User".into()), StoreType::BigInt)
            .is_none());
    }
}
