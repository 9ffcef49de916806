/// Declared host-side type of a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    I32,
    I64,
    F64,
    String,
    List,
    Map,
    /// A registered object type, identified by name.
    Object(String),
    /// Type is not declared; decided at first use.
    Unknown,
}

impl Type {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Type::List)
    }

    /// Parses a declared-type attribute as written in marker metadata.
    pub fn parse(src: &str) -> Type {
        match src {
            "bool" => Type::Bool,
            "i32" | "int" => Type::I32,
            "i64" | "long" => Type::I64,
            "f64" | "double" => Type::F64,
            "string" => Type::String,
            "list" => Type::List,
            "map" => Type::Map,
            other => Type::Object(other.to_string()),
        }
    }
}

impl core::fmt::Display for Type {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Type::Bool => f.write_str("bool"),
            Type::I32 => f.write_str("i32"),
            Type::I64 => f.write_str("i64"),
            Type::F64 => f.write_str("f64"),
            Type::String => f.write_str("string"),
            Type::List => f.write_str("list"),
            Type::Map => f.write_str("map"),
            Type::Object(name) => f.write_str(name),
            Type::Unknown => f.write_str("unknown"),
        }
    }
}

/// Column type on the store side of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StoreType {
    Boolean,
    Integer,
    BigInt,
    Double,
    Varchar,
    Timestamp,
    /// Explicit SQL NULL, for stores that need the type spelled out.
    Null,
    /// Anything else; conversion is deferred to the driver.
    #[default]
    Other,
}

impl StoreType {
    pub fn parse(src: &str) -> StoreType {
        match src.to_ascii_uppercase().as_str() {
            "BOOLEAN" => StoreType::Boolean,
            "INTEGER" => StoreType::Integer,
            "BIGINT" => StoreType::BigInt,
            "DOUBLE" => StoreType::Double,
            "VARCHAR" => StoreType::Varchar,
            "TIMESTAMP" => StoreType::Timestamp,
            "NULL" => StoreType::Null,
            _ => StoreType::Other,
        }
    }
}
