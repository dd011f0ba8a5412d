use thiserror::Error;

/// Why subscripting a value failed
///
/// The flavour probe in [`crate::Flavour::of`] tells mappings from sequences
/// by which of these a deliberately bogus lookup produces.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The key is of an acceptable type but not present
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// The index is an integer but outside the container
    #[error("index out of range: {0}")]
    IndexOutOfRange(i64),

    /// The container does not accept keys of this type
    #[error("{container} indices must not be {key}")]
    TypeMismatch {
        /// Type name of the subscripted value
        container: String,
        /// Type name of the offending key
        key: String,
    },

    /// The value does not support `[]` at all
    #[error("'{0}' object is not subscriptable")]
    NotSubscriptable(String),
}

/// Failure to resolve an expression against a namespace
///
/// Never surfaces past the completer: every variant is treated as
/// "could not resolve" and yields zero matches.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// The expression text could not be parsed
    #[error("invalid syntax at byte {position}: {message}")]
    Syntax {
        /// Byte offset into the expression
        position: usize,
        /// What the parser expected
        message: String,
    },

    /// A bare name is not bound in any scope
    #[error("name '{0}' is not defined")]
    UnknownName(String),

    /// `.name` on a value without that member
    #[error("'{owner}' object has no attribute '{name}'")]
    MissingAttribute {
        /// Type name of the value
        owner: String,
        /// Requested member
        name: String,
    },

    /// `[key]` failed
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// `(...)` on something that cannot be invoked
    #[error("'{0}' object is not callable")]
    NotCallable(String),

    /// The invoked function reported an error
    #[error("call to {name} failed: {reason}")]
    CallFailed {
        /// Function name
        name: String,
        /// Error text from the function
        reason: String,
    },

    /// The expression contains a call and call evaluation is disabled
    #[error("evaluation of calls is disabled: {0}")]
    CallBlocked(String),
}

/// Standard [`std::result::Result`], with [`EvalError`] as the error variant
pub type EvalResult<T> = std::result::Result<T, EvalError>;
