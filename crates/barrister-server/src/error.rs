use barrister_idl::SchemaError;
use thiserror::Error;

/// Failure converting a wire value against a field descriptor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The value or the representation does not fit the descriptor
    #[error("{path}: {message}")]
    Mismatch { path: String, message: String },

    /// The descriptor names a type the contract does not define
    #[error("{path}: unknown type: {type_name}")]
    UnknownType { path: String, type_name: String },
}

impl ConvertError {
    pub(crate) fn mismatch(path: &str, message: impl Into<String>) -> Self {
        ConvertError::Mismatch {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            ConvertError::Mismatch { path, .. } | ConvertError::UnknownType { path, .. } => path,
        }
    }
}

/// A handler does not conform to the interface it is registered for
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("IDL has no interface: {0}")]
    UnknownInterface(String),

    #[error("{interface} handler has no function named: {function}")]
    MissingFunction { interface: String, function: String },

    #[error("{interface} handler function {function} accepts {actual} params but IDL specifies {expected}")]
    Arity {
        interface: String,
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("{interface} handler function {function} returns {actual} values but must return 2 ending in an rpc error")]
    ReturnShape {
        interface: String,
        function: String,
        actual: usize,
    },

    #[error("{path} has invalid type: {repr} reason: {reason}")]
    TypeMismatch {
        path: String,
        repr: String,
        reason: String,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Errors raised while assembling a [`crate::Server`]
#[derive(Debug, Error)]
pub enum ServerBuildError {
    #[error("invalid contract: {0}")]
    Schema(#[from] SchemaError),

    #[error("handler registration failed: {0}")]
    Registration(#[from] RegistrationError),
}

pub type RegistrationResult<T> = std::result::Result<T, RegistrationError>;
