mod discriminator;
pub use discriminator::Discriminator;

mod field_binding;
pub use field_binding::{ColumnRef, FieldBinding};

mod result_map;
pub use result_map::{AutoMapping, ResultMap, ResultMapBuilder};
