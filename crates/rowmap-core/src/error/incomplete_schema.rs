use super::Error;

/// Error when a definition references another definition that has not
/// been registered yet.
///
/// Recoverable during configuration load: failing resolutions are
/// queued and retried once more definitions become available. A
/// definition still unresolved after a finalization pass is fatal,
/// reported with the accumulated dependency chain.
#[derive(Debug)]
pub(super) struct IncompleteSchemaError {
    dependent: Box<str>,
    missing: Box<str>,
}

impl std::error::Error for IncompleteSchemaError {}

impl core::fmt::Display for IncompleteSchemaError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "`{}` references `{}`, which is not defined",
            self.dependent, self.missing
        )
    }
}

impl Error {
    /// Creates an incomplete schema error for an unresolved reference.
    pub fn incomplete_schema(dependent: impl Into<String>, missing: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::IncompleteSchema(IncompleteSchemaError {
            dependent: dependent.into().into(),
            missing: missing.into().into(),
        }))
    }

    /// Returns `true` if this error is an incomplete schema error.
    pub fn is_incomplete_schema(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::IncompleteSchema(_))
    }
}
