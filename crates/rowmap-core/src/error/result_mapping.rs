use super::Error;

/// Error when a column value cannot be applied to a property during
/// result materialization.
///
/// Fatal for the whole query result; partial rows are never silently
/// dropped. Wraps the originating column and property names.
#[derive(Debug)]
pub(super) struct ResultMappingError {
    column: Box<str>,
    property: Box<str>,
    message: Box<str>,
}

impl std::error::Error for ResultMappingError {}

impl core::fmt::Display for ResultMappingError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "result mapping failed for column `{}` -> property `{}`: {}",
            self.column, self.property, self.message
        )
    }
}

impl Error {
    /// Creates a result mapping error naming the column and property.
    pub fn result_mapping(
        column: impl Into<String>,
        property: impl Into<String>,
        message: impl Into<String>,
    ) -> Error {
        Error::from(super::ErrorKind::ResultMapping(ResultMappingError {
            column: column.into().into(),
            property: property.into().into(),
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a result mapping error.
    pub fn is_result_mapping(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::ResultMapping(_))
    }
}
