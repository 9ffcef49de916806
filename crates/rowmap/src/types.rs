use indexmap::IndexMap;
use rowmap_core::Type;

/// Registered description of a target object type: its properties,
/// whether it can be built with no arguments, and its declared
/// constructors in declaration order.
///
/// A result map whose target type has no registered descriptor is
/// treated as a dynamic type: default-constructible, with properties
/// named directly after the columns that produce them.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub name: String,
    pub properties: IndexMap<String, Type>,
    pub has_default: bool,
    pub constructors: Vec<Constructor>,
}

/// One declared constructor: an ordered (name, type) parameter list.
#[derive(Debug, Clone)]
pub struct Constructor {
    pub params: Vec<(String, Type)>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> TypeDescriptor {
        TypeDescriptor {
            name: name.into(),
            properties: IndexMap::new(),
            has_default: true,
            constructors: vec![],
        }
    }

    pub fn property(mut self, name: impl Into<String>, ty: Type) -> TypeDescriptor {
        self.properties.insert(name.into(), ty);
        self
    }

    pub fn without_default(mut self) -> TypeDescriptor {
        self.has_default = false;
        self
    }

    pub fn constructor(mut self, params: Vec<(&str, Type)>) -> TypeDescriptor {
        self.constructors.push(Constructor {
            params: params
                .into_iter()
                .map(|(name, ty)| (name.to_string(), ty))
                .collect(),
        });
        self
    }

    pub fn property_ty(&self, name: &str) -> Option<&Type> {
        self.properties.get(name)
    }

    /// Finds the property a result column maps to.
    ///
    /// Matching is case-insensitive; with `underscore` set, underscores
    /// in the column name are ignored so `user_name` matches
    /// `userName`.
    pub fn match_property(&self, column: &str, underscore: bool) -> Option<&str> {
        self.properties
            .keys()
            .find(|property| column_matches(property, column, underscore))
            .map(String::as_str)
    }
}

fn column_matches(property: &str, column: &str, underscore: bool) -> bool {
    if property.eq_ignore_ascii_case(column) {
        return true;
    }
    underscore && property.eq_ignore_ascii_case(&column.replace('_', ""))
}
