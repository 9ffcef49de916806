use crate::{path::Step, Path, Value};

use indexmap::IndexMap;

/// The fixed key under which the whole parameter object is reachable
/// from an expression, regardless of ad-hoc bindings shadowing its
/// top-level properties.
pub const PARAMETER_KEY: &str = "_parameter";

/// The dynamic property map an expression is evaluated against.
///
/// Lookup order: ad-hoc bindings injected by enclosing loop/bind
/// nodes, then the synthetic [`PARAMETER_KEY`] namespace, then direct
/// property-path access into the parameter object.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    bindings: Option<&'a IndexMap<String, Value>>,
    parameter: &'a Value,
}

impl<'a> EvalContext<'a> {
    pub fn new(parameter: &'a Value) -> EvalContext<'a> {
        EvalContext {
            bindings: None,
            parameter,
        }
    }

    pub fn with_bindings(
        parameter: &'a Value,
        bindings: &'a IndexMap<String, Value>,
    ) -> EvalContext<'a> {
        EvalContext {
            bindings: Some(bindings),
            parameter,
        }
    }

    pub fn parameter(&self) -> &Value {
        self.parameter
    }

    /// Resolves a property path. Missing paths resolve to `Null`.
    pub fn resolve(&self, path: &Path) -> Value {
        if let Some(Step::Prop(root)) = path.steps().first() {
            // bindings layer over the synthetic namespace
            if let Some(bindings) = self.bindings {
                if let Some(bound) = bindings.get(root.as_str()) {
                    return bound.get_path(&path.tail());
                }
            }

            if root == PARAMETER_KEY {
                return self.parameter.get_path(&path.tail());
            }
        }

        self.parameter.get_path(path)
    }
}
