use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// entity named by a not-found error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Client,
    Credit,
    Installment,
    Payment,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Client => "client",
            EntityKind::Credit => "credit",
            EntityKind::Installment => "installment",
            EntityKind::Payment => "payment",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServicingError {
    #[error("validation error: {message}")]
    Validation {
        message: String,
    },

    #[error("{entity} not found: {id}")]
    NotFound {
        entity: EntityKind,
        id: String,
    },

    #[error("invalid state: {message}")]
    DomainState {
        message: String,
    },

    #[error("store error: {message}")]
    Store {
        message: String,
    },
}

impl ServicingError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServicingError::Validation { message: message.into() }
    }

    pub fn not_found(entity: EntityKind, id: impl fmt::Display) -> Self {
        ServicingError::NotFound { entity, id: id.to_string() }
    }

    pub fn domain_state(message: impl Into<String>) -> Self {
        ServicingError::DomainState { message: message.into() }
    }

    pub fn store(message: impl Into<String>) -> Self {
        ServicingError::Store { message: message.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServicingError::Validation { .. } => ErrorKind::Validation,
            ServicingError::NotFound { .. } => ErrorKind::NotFound,
            ServicingError::DomainState { .. } => ErrorKind::DomainState,
            ServicingError::Store { .. } => ErrorKind::Store,
        }
    }
}

/// error discriminant exposed to API callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    DomainState,
    Store,
}

/// structured error record for the API boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ServicingError> for ErrorResponse {
    fn from(err: &ServicingError) -> Self {
        ErrorResponse {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<ServicingError> for ErrorResponse {
    fn from(err: ServicingError) -> Self {
        ErrorResponse::from(&err)
    }
}

pub type Result<T> = std::result::Result<T, ServicingError>;
