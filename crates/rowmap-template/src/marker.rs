use rowmap_core::{Error, Path, Result, StoreType, Type};

/// One parsed `#{...}` bound-parameter marker.
///
/// Syntax: `#{path}` or `#{path,attr=val,...}` with recognized
/// attributes `valueType`, `storeType`, `numericScale` and `select`
/// (a nested-query reference, consumed by the mapping layer).
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMarker {
    /// The original marker text, for error reporting.
    pub text: String,

    /// Property path to resolve at bind time.
    pub path: Path,

    /// Declared value type; `Unknown` defers to the resolved value's
    /// runtime type.
    pub ty: Type,

    /// Target store column type.
    pub store_ty: StoreType,

    pub numeric_scale: Option<u32>,

    /// Statement id of a nested query supplying this value.
    pub select: Option<String>,
}

impl ParameterMarker {
    pub fn parse(content: &str) -> Result<ParameterMarker> {
        let mut parts = content.split(',');

        let path_text = parts.next().unwrap_or("").trim();
        let path = Path::parse(path_text)
            .map_err(|err| Error::parameter_binding(content, "malformed property path").context(err))?;

        let mut marker = ParameterMarker {
            text: content.to_string(),
            path,
            ty: Type::Unknown,
            store_ty: StoreType::Other,
            numeric_scale: None,
            select: None,
        };

        for part in parts {
            let Some((name, value)) = part.split_once('=') else {
                return Err(Error::parameter_binding(
                    content,
                    format!("malformed attribute `{}`", part.trim()),
                ));
            };
            let (name, value) = (name.trim(), value.trim());

            match name {
                "valueType" | "javaType" => marker.ty = Type::parse(value),
                "storeType" | "jdbcType" => marker.store_ty = StoreType::parse(value),
                "numericScale" => {
                    marker.numeric_scale = Some(value.parse().map_err(|_| {
                        Error::parameter_binding(content, "numericScale is not a number")
                    })?)
                }
                "select" => marker.select = Some(value.to_string()),
                other => {
                    return Err(Error::parameter_binding(
                        content,
                        format!("unknown attribute `{other}`"),
                    ))
                }
            }
        }

        Ok(marker)
    }
}
