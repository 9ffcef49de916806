mod adhoc;
mod expression;
mod incomplete_schema;
mod invalid_substitution;
mod no_viable_constructor;
mod parameter_binding;
mod result_mapping;
mod template_compile;
mod type_conversion;
mod unresolved_discriminator;

use adhoc::AdhocError;
use expression::ExpressionError;
use incomplete_schema::IncompleteSchemaError;
use invalid_substitution::InvalidSubstitutionError;
use no_viable_constructor::NoViableConstructorError;
use parameter_binding::ParameterBindingError;
use result_mapping::ResultMappingError;
use std::sync::Arc;
use template_compile::TemplateCompileError;
use type_conversion::TypeConversionError;
use unresolved_discriminator::UnresolvedDiscriminatorError;

/// Creates an ad-hoc error from format arguments.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::from_args(format_args!($($arg)*))
    };
}

/// Returns early with an ad-hoc error.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::from_args(format_args!($($arg)*)))
    };
}

/// An error that can occur anywhere in the mapping engine.
#[derive(Clone)]
pub struct Error {
    inner: Arc<ErrorInner>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

#[derive(Debug)]
enum ErrorKind {
    Anyhow(anyhow::Error),
    Adhoc(AdhocError),
    TemplateCompile(TemplateCompileError),
    Expression(ExpressionError),
    InvalidSubstitution(InvalidSubstitutionError),
    ParameterBinding(ParameterBindingError),
    NoViableConstructor(NoViableConstructorError),
    ResultMapping(ResultMappingError),
    UnresolvedDiscriminator(UnresolvedDiscriminatorError),
    IncompleteSchema(IncompleteSchemaError),
    TypeConversion(TypeConversionError),
}

impl Error {
    #[doc(hidden)]
    pub fn from_args(args: core::fmt::Arguments<'_>) -> Error {
        Error::from(ErrorKind::Adhoc(AdhocError::from_args(args)))
    }

    /// Adds context to this error.
    ///
    /// Context is displayed outermost first, ending with the root cause.
    pub fn context(self, consequent: Error) -> Error {
        let mut inner = Arc::try_unwrap(consequent.inner)
            .unwrap_or_else(|shared| ErrorInner {
                kind: ErrorKind::Adhoc(AdhocError::new(shared.kind.to_string())),
                cause: shared.cause.clone(),
            });
        debug_assert!(inner.cause.is_none(), "consequent already has a cause");
        inner.cause = Some(self);
        Error {
            inner: Arc::new(inner),
        }
    }

    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.cause.as_ref()?;
            Some(err)
        }))
    }

    fn kind(&self) -> &ErrorKind {
        &self.inner.kind
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind() {
            ErrorKind::Anyhow(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            f.debug_struct("Error")
                .field("kind", &self.inner.kind)
                .field("cause", &self.inner.cause)
                .finish()
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match self {
            Anyhow(err) => core::fmt::Display::fmt(err, f),
            Adhoc(err) => core::fmt::Display::fmt(err, f),
            TemplateCompile(err) => core::fmt::Display::fmt(err, f),
            Expression(err) => core::fmt::Display::fmt(err, f),
            InvalidSubstitution(err) => core::fmt::Display::fmt(err, f),
            ParameterBinding(err) => core::fmt::Display::fmt(err, f),
            NoViableConstructor(err) => core::fmt::Display::fmt(err, f),
            ResultMapping(err) => core::fmt::Display::fmt(err, f),
            UnresolvedDiscriminator(err) => core::fmt::Display::fmt(err, f),
            IncompleteSchema(err) => core::fmt::Display::fmt(err, f),
            TypeConversion(err) => core::fmt::Display::fmt(err, f),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Arc::new(ErrorInner { kind, cause: None }),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::from(ErrorKind::Anyhow(err))
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}

impl From<std::num::ParseFloatError> for Error {
    fn from(err: std::num::ParseFloatError) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}
