use super::Error;

/// Error when an expression cannot be parsed or evaluated.
///
/// This occurs when:
/// - The expression text is not valid in the expression grammar
/// - A null or missing value is iterated where a sequence was required
/// - Operands of a comparison have incompatible types
#[derive(Debug)]
pub(super) struct ExpressionError {
    message: Box<str>,
}

impl std::error::Error for ExpressionError {}

impl core::fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "expression failed: {}", self.message)
    }
}

impl Error {
    /// Creates an expression error.
    pub fn expression(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Expression(ExpressionError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an expression error.
    pub fn is_expression(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Expression(_))
    }
}
