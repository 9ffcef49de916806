use crate::{BoundSql, ParameterMarker};

use rowmap_core::{
    expr::PARAMETER_KEY, path::Step, Error, Path, Result, StoreType, Type, Value,
};

/// One value ready for execution, matched to a positional placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParam {
    /// 1-based placeholder position.
    pub ordinal: usize,

    pub value: Value,

    /// Declared type, or the resolved value's runtime type when the
    /// marker declared none.
    pub ty: Type,

    pub store_ty: StoreType,

    pub numeric_scale: Option<u32>,
}

/// Resolves every marker of a rendered statement into an ordered
/// parameter list matching the `?` placeholders.
///
/// Each marker's path is resolved against the accumulated render
/// bindings first, then the parameter object itself. A path that
/// exists nowhere raises a `ParameterBinding` error naming the marker;
/// a path that exists but holds null binds null.
pub fn bind_parameters(bound: &BoundSql, parameter: &Value) -> Result<Vec<BoundParam>> {
    bound
        .markers
        .iter()
        .enumerate()
        .map(|(i, marker)| {
            let value = resolve(marker, bound, parameter)?;

            let ty = if marker.ty.is_unknown() {
                value.infer_ty()
            } else {
                marker.ty.clone()
            };

            Ok(BoundParam {
                ordinal: i + 1,
                value,
                ty,
                store_ty: marker.store_ty,
                numeric_scale: marker.numeric_scale,
            })
        })
        .collect()
}

fn resolve(marker: &ParameterMarker, bound: &BoundSql, parameter: &Value) -> Result<Value> {
    let path = &marker.path;

    if let Some(root) = path.root() {
        // render bindings layer over the synthetic namespace
        if let Some(bound_value) = bound.bindings.get(root) {
            return Ok(bound_value.get_path(&path.tail()));
        }

        if root == PARAMETER_KEY {
            return Ok(parameter.get_path(&path.tail()));
        }
    }

    if has_path(parameter, path) {
        return Ok(parameter.get_path(path));
    }

    // A sole scalar parameter binds directly, whatever the marker
    // calls it.
    if path.is_single() && !is_compound(parameter) {
        return Ok(parameter.clone());
    }

    Err(Error::parameter_binding(
        &marker.text,
        format!(
            "property `{path}` not found on {} parameter",
            parameter.type_name()
        ),
    ))
}

fn is_compound(value: &Value) -> bool {
    matches!(value, Value::Map(_) | Value::Object(_) | Value::List(_))
}

/// Whether the path exists on the value, even if it holds null.
fn has_path(value: &Value, path: &Path) -> bool {
    let mut current = value.clone();

    for step in path.steps() {
        current = match (&current, step) {
            (Value::Map(map), Step::Prop(name)) => match map.get(name.as_str()) {
                Some(next) => next.clone(),
                None => return false,
            },
            (Value::Object(object), Step::Prop(name)) => {
                if !object.has_property(name) {
                    return false;
                }
                object.get(name)
            }
            (Value::List(items), Step::Index(index)) => match items.get(*index) {
                Some(next) => next.clone(),
                None => return false,
            },
            _ => return false,
        };
    }

    true
}
