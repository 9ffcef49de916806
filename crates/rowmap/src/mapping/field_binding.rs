use rowmap_core::{StoreType, Type};

/// Column side of a binding: one column name, or a composite
/// `{prop=col,..}` spec assembling several columns into a synthetic
/// parameter container for a nested select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Column(String),
    Composite(Vec<(String, String)>),
}

impl ColumnRef {
    pub fn parse(src: &str) -> ColumnRef {
        let trimmed = src.trim();

        if let Some(inner) = trimmed.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            return ColumnRef::Composite(
                inner
                    .split(',')
                    .filter_map(|pair| {
                        pair.split_once('=')
                            .map(|(prop, col)| (prop.trim().to_string(), col.trim().to_string()))
                    })
                    .collect(),
            );
        }

        ColumnRef::Column(trimmed.to_string())
    }

    /// The single column name, if this is not a composite spec.
    pub fn single(&self) -> Option<&str> {
        match self {
            ColumnRef::Column(name) => Some(name),
            ColumnRef::Composite(_) => None,
        }
    }
}

/// One column-to-property mapping rule inside a result map.
#[derive(Debug, Clone)]
pub struct FieldBinding {
    pub column: ColumnRef,
    pub property: String,

    /// Declared host type of the property.
    pub ty: Type,
    pub store_ty: StoreType,

    /// Named converter override; the (type, store type) lookup applies
    /// otherwise.
    pub converter: Option<String>,

    /// Result map resolved recursively against the same row.
    pub nested_map: Option<String>,

    /// Statement id of a secondary query supplying this property.
    pub nested_select: Option<String>,

    /// Prefix disambiguating this binding's columns from same-named
    /// joined columns.
    pub column_prefix: Option<String>,

    /// Columns that must be non-null for a nested object to be created
    /// at all.
    pub not_null_columns: Vec<String>,

    /// Participates in row identity.
    pub id: bool,

    /// Supplies a constructor argument instead of a property set.
    pub constructor: bool,

    /// Defer the nested select until first access.
    pub lazy: bool,
}

impl FieldBinding {
    pub fn new(column: &str, property: &str) -> FieldBinding {
        FieldBinding {
            column: ColumnRef::parse(column),
            property: property.to_string(),
            ty: Type::Unknown,
            store_ty: StoreType::Other,
            converter: None,
            nested_map: None,
            nested_select: None,
            column_prefix: None,
            not_null_columns: vec![],
            id: false,
            constructor: false,
            lazy: false,
        }
    }

    pub fn ty(mut self, ty: Type) -> FieldBinding {
        self.ty = ty;
        self
    }

    pub fn store_ty(mut self, store_ty: StoreType) -> FieldBinding {
        self.store_ty = store_ty;
        self
    }

    pub fn converter(mut self, name: &str) -> FieldBinding {
        self.converter = Some(name.to_string());
        self
    }

    pub fn nested_map(mut self, id: &str) -> FieldBinding {
        self.nested_map = Some(id.to_string());
        self
    }

    pub fn nested_select(mut self, id: &str) -> FieldBinding {
        self.nested_select = Some(id.to_string());
        self
    }

    pub fn column_prefix(mut self, prefix: &str) -> FieldBinding {
        self.column_prefix = Some(prefix.to_string());
        self
    }

    pub fn not_null_columns(mut self, columns: &[&str]) -> FieldBinding {
        self.not_null_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn id(mut self) -> FieldBinding {
        self.id = true;
        self
    }

    pub fn constructor(mut self) -> FieldBinding {
        self.constructor = true;
        self
    }

    pub fn lazy(mut self) -> FieldBinding {
        self.lazy = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_column() {
        assert_eq!(
            ColumnRef::parse("user_id"),
            ColumnRef::Column("user_id".to_string())
        );
    }

    #[test]
    fn parse_composite_spec() {
        assert_eq!(
            ColumnRef::parse("{id=user_id, region=region_code}"),
            ColumnRef::Composite(vec![
                ("id".to_string(), "user_id".to_string()),
                ("region".to_string(), "region_code".to_string()),
            ])
        );
    }
}
