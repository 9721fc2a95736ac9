use crate::Value;
use std::any;
use thiserror::Error;

/// Failure categories raised by dal.
///
/// Every public operation returns an [`anyhow::Error`](crate::Error). When the failure
/// originates inside dal it carries one of these variants, either as the error itself or as
/// context on top of a driver error, so callers can classify it with
/// `error.downcast_ref::<DalError>()`.
#[derive(Debug, Error)]
pub enum DalError {
    /// Missing or invalid connection parameters.
    #[error("Configuration error: {0}")]
    Config(String),
    /// Opening or pinging the store failed.
    #[error("Connectivity error: {0}")]
    Connectivity(String),
    /// Empty equality field set, empty raw expression or an unusable condition.
    #[error("Condition error: {0}")]
    Condition(String),
    /// Empty table name, empty payload or empty transaction batch.
    #[error("Entity error: {0}")]
    Entity(String),
    /// Incompatible source and destination shapes, or unparsable text.
    #[error("Decode error: expected `{expected}`, got {actual}: {reason}")]
    Decode {
        expected: &'static str,
        actual: &'static str,
        reason: String,
    },
    /// The store rejected a statement.
    #[error("Execution error: {0}")]
    Execution(String),
    /// The API was used in a way that can never succeed.
    #[error("Usage error: {0}")]
    Usage(String),
}

impl DalError {
    pub fn decode<T: ?Sized>(value: &Value, reason: impl Into<String>) -> crate::Error {
        DalError::Decode {
            expected: any::type_name::<T>(),
            actual: value.kind_name(),
            reason: reason.into(),
        }
        .into()
    }

    pub fn unconvertible<T: ?Sized>(value: &Value) -> crate::Error {
        Self::decode::<T>(value, "unconvertible type")
    }

    pub fn condition(message: impl Into<String>) -> crate::Error {
        DalError::Condition(message.into()).into()
    }

    pub fn entity(message: impl Into<String>) -> crate::Error {
        DalError::Entity(message.into()).into()
    }

    pub fn usage(message: impl Into<String>) -> crate::Error {
        DalError::Usage(message.into()).into()
    }

    pub fn config(message: impl Into<String>) -> crate::Error {
        DalError::Config(message.into()).into()
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Returns the [`DalError`] carried by `error`, if any.
pub fn error_kind(error: &crate::Error) -> Option<&DalError> {
    error.downcast_ref::<DalError>()
}
