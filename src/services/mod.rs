use thiserror::Error;

use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::repository::errors::RepositoryError;
use crate::store::{ErrorKind, ErrorState};

pub mod meetings;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("entity not found")]
    NotFound,

    #[error("form error: {0}")]
    Form(String),

    #[error("type constraint violated: {0}")]
    TypeConstraint(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// User-facing description of the failure.
    pub fn error_state(&self) -> ErrorState {
        match self {
            ServiceError::Repository(err) => ErrorState::from(err),
            ServiceError::NotFound => ErrorState {
                kind: ErrorKind::NotFound,
                message: "Meeting not found.".to_string(),
                retryable: false,
            },
            ServiceError::Form(message) | ServiceError::TypeConstraint(message) => ErrorState {
                kind: ErrorKind::Validation,
                message: message.clone(),
                retryable: false,
            },
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(val: FormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}
