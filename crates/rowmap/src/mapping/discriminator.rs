use super::FieldBinding;

use indexmap::IndexMap;

/// Column-driven polymorphic result-map selector.
///
/// The bound column's converted value, as text, selects the result map
/// that actually handles the row. Resolution is recursive: the chosen
/// map may itself carry a discriminator. A value that would re-select
/// an already-visited map terminates the chain there; a value with no
/// case at all is an unresolved-discriminator error.
#[derive(Debug, Clone)]
pub struct Discriminator {
    pub binding: FieldBinding,
    pub cases: IndexMap<String, String>,
}

impl Discriminator {
    pub fn new(column: &str) -> Discriminator {
        Discriminator {
            binding: FieldBinding::new(column, column),
            cases: IndexMap::new(),
        }
    }

    pub fn case(mut self, value: &str, result_map: &str) -> Discriminator {
        self.cases.insert(value.to_string(), result_map.to_string());
        self
    }
}
