pub mod bind;
pub use bind::{bind_parameters, BoundParam};

pub mod marker;
pub use marker::ParameterMarker;

pub mod node;
pub use node::SqlNode;

mod parser;
pub use parser::TemplateParser;

mod render;
pub use render::RenderContext;

pub mod source;
pub use source::{BoundSql, SqlSource};

mod token;
