//! Error taxonomy and translation of native failures.
//!
//! Every failure that reaches a caller is a [`BindingError`]. Native routines
//! report [`NativeError`], which only crosses the boundary through
//! [`translate_native`] (also reached via `From`/`?`). Panics raised inside a
//! native routine are caught by [`guard_native`] and reported the same way.
use log::warn;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    Shape,
    NativeComputation,
}

/// Host-facing error returned by every binding entry point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    /// Missing or malformed option object or option field. Raised before any
    /// native call.
    #[error("{message}")]
    InvalidArgument {
        field: String,
        expected: String,
        message: String,
    },
    /// Operand dimensions or types do not fit the requested operation.
    #[error("{0}")]
    Shape(String),
    /// The native routine failed for reasons opaque to the binding layer.
    #[error("native: {0}")]
    NativeComputation(String),
}

impl BindingError {
    /// `"Invalid type for <field>"`: the field is absent or of the wrong kind.
    pub fn invalid_type(field: impl Into<String>, expected: impl Into<String>) -> Self {
        let field = field.into();
        Self::InvalidArgument {
            message: format!("Invalid type for {field}"),
            expected: expected.into(),
            field,
        }
    }

    pub fn invalid_argument(
        field: impl Into<String>,
        expected: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            expected: expected.into(),
            message: message.into(),
        }
    }

    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Shape(_) => ErrorKind::Shape,
            Self::NativeComputation(_) => ErrorKind::NativeComputation,
        }
    }

    /// Offending field for argument errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidArgument { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Raw failure reported by a native routine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{routine}: {message}")]
pub struct NativeError {
    pub routine: &'static str,
    pub message: String,
}

impl NativeError {
    pub fn new(routine: &'static str, message: impl Into<String>) -> Self {
        Self {
            routine,
            message: message.into(),
        }
    }
}

/// Normalises a native failure into [`BindingError::NativeComputation`].
pub fn translate_native(err: NativeError) -> BindingError {
    warn!("native routine {} failed: {}", err.routine, err.message);
    BindingError::NativeComputation(err.to_string())
}

impl From<NativeError> for BindingError {
    fn from(err: NativeError) -> Self {
        translate_native(err)
    }
}

/// Runs `f`, converting a panic inside it into a `NativeComputation` error.
pub fn guard_native<R>(
    routine: &'static str,
    f: impl FnOnce() -> Result<R, BindingError>,
) -> Result<R, BindingError> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(translate_native(NativeError::new(
            routine,
            format!("panicked: {}", panic_message(payload.as_ref())),
        ))),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_type_message_is_exact() {
        let err = BindingError::invalid_type("code", "color conversion code");
        assert_eq!(err.to_string(), "Invalid type for code");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.field(), Some("code"));
    }

    #[test]
    fn native_errors_are_prefixed_and_forwarded_verbatim() {
        let err: BindingError = NativeError::new("warpPerspective", "matrix is singular").into();
        assert_eq!(err.kind(), ErrorKind::NativeComputation);
        assert_eq!(err.to_string(), "native: warpPerspective: matrix is singular");
    }

    #[test]
    fn guard_turns_panics_into_native_errors() {
        let result: Result<(), BindingError> =
            guard_native("erode", || panic!("kernel exploded"));
        let err = result.expect_err("panic must be translated");
        assert_eq!(err.kind(), ErrorKind::NativeComputation);
        assert!(err.to_string().contains("kernel exploded"));
    }

    #[test]
    fn guard_passes_results_through() {
        let ok = guard_native("noop", || Ok::<_, BindingError>(7));
        assert_eq!(ok, Ok(7));
        let err = guard_native("noop", || Err::<(), _>(BindingError::shape("bad")));
        assert_eq!(err, Err(BindingError::Shape("bad".into())));
    }
}
