use super::Error;

/// Error when a `#{}` marker cannot be bound to a value.
///
/// Carries the offending marker text so the failing template can be
/// located without engine internals.
#[derive(Debug)]
pub(super) struct ParameterBindingError {
    marker: Box<str>,
    message: Box<str>,
}

impl std::error::Error for ParameterBindingError {}

impl core::fmt::Display for ParameterBindingError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "cannot bind parameter `#{{{}}}`: {}",
            self.marker, self.message
        )
    }
}

impl Error {
    /// Creates a parameter binding error naming the offending marker.
    pub fn parameter_binding(marker: impl Into<String>, message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::ParameterBinding(ParameterBindingError {
            marker: marker.into().into(),
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a parameter binding error.
    pub fn is_parameter_binding(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::ParameterBinding(_))
    }
}
