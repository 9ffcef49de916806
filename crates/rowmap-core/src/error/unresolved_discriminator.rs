use super::Error;

/// Error when a discriminator column value maps to no known result map
/// and is not a terminating self-reference.
#[derive(Debug)]
pub(super) struct UnresolvedDiscriminatorError {
    value: Box<str>,
}

impl std::error::Error for UnresolvedDiscriminatorError {}

impl core::fmt::Display for UnresolvedDiscriminatorError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "discriminator value `{}` maps to no known result map",
            self.value
        )
    }
}

impl Error {
    /// Creates an unresolved discriminator error naming the value.
    pub fn unresolved_discriminator(value: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnresolvedDiscriminator(
            UnresolvedDiscriminatorError {
                value: value.into().into(),
            },
        ))
    }

    /// Returns `true` if this error is an unresolved discriminator error.
    pub fn is_unresolved_discriminator(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnresolvedDiscriminator(_))
    }
}
