use super::Error;

/// Error when no constructor of a target type can be satisfied from
/// the current row and no default constructor exists.
#[derive(Debug)]
pub(super) struct NoViableConstructorError {
    type_name: Box<str>,
}

impl std::error::Error for NoViableConstructorError {}

impl core::fmt::Display for NoViableConstructorError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "no viable constructor for type `{}`", self.type_name)
    }
}

impl Error {
    /// Creates a no-viable-constructor error for the target type.
    pub fn no_viable_constructor(type_name: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::NoViableConstructor(
            NoViableConstructorError {
                type_name: type_name.into().into(),
            },
        ))
    }

    /// Returns `true` if this error is a no-viable-constructor error.
    pub fn is_no_viable_constructor(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::NoViableConstructor(_))
    }
}
