use super::Error;

/// Error when a statement template cannot be compiled.
///
/// This occurs when:
/// - Control tags are malformed or improperly nested
/// - A `choose` block declares zero or multiple `otherwise` branches
/// - A fragment inclusion exceeds the expansion depth cap
///
/// These are configuration-time errors; no partial template is ever
/// published.
#[derive(Debug)]
pub(super) struct TemplateCompileError {
    message: Box<str>,
}

impl std::error::Error for TemplateCompileError {}

impl core::fmt::Display for TemplateCompileError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "template compile failed: {}", self.message)
    }
}

impl Error {
    /// Creates a template compile error.
    pub fn template_compile(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::TemplateCompile(TemplateCompileError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a template compile error.
    pub fn is_template_compile(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::TemplateCompile(_))
    }
}
