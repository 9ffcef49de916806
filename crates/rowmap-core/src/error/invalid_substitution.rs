use super::Error;

/// Error when a `${}` substitution value fails the configured
/// injection-guard pattern.
#[derive(Debug)]
pub(super) struct InvalidSubstitutionError {
    value: Box<str>,
}

impl std::error::Error for InvalidSubstitutionError {}

impl core::fmt::Display for InvalidSubstitutionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "substitution value rejected by validation pattern: {:?}",
            self.value
        )
    }
}

impl Error {
    /// Creates an invalid substitution error for the rejected value.
    pub fn invalid_substitution(value: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidSubstitution(
            InvalidSubstitutionError {
                value: value.into().into(),
            },
        ))
    }

    /// Returns `true` if this error is an invalid substitution error.
    pub fn is_invalid_substitution(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidSubstitution(_))
    }
}
