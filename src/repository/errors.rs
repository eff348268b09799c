use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::types::TypeConstraintError;

/// Failures of the meetings REST API, classified the way the UI reports them.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Permission denied")]
    Permission,

    #[error("Entity not found")]
    NotFound,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error ({0})")]
    Server(u16),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Server(_))
    }

    /// Classifies a non-success HTTP status.
    ///
    /// `message` is the server-provided explanation, used for 422 responses.
    pub fn from_status(status: StatusCode, message: Option<String>) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Permission,
            404 => Self::NotFound,
            422 => Self::Validation(
                message.unwrap_or_else(|| "The submitted data is invalid".to_string()),
            ),
            code if status.is_server_error() => Self::Server(code),
            code => Self::Unexpected(format!("unexpected status {code}")),
        }
    }
}

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RepositoryError::Unexpected(format!("Malformed response: {err}"))
        } else if let Some(status) = err.status() {
            RepositoryError::from_status(status, None)
        } else {
            RepositoryError::Network(err.to_string())
        }
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::Validation(val.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(
            RepositoryError::from_status(StatusCode::FORBIDDEN, None),
            RepositoryError::Permission
        ));
        assert!(matches!(
            RepositoryError::from_status(StatusCode::UNAUTHORIZED, None),
            RepositoryError::Permission
        ));
        assert!(matches!(
            RepositoryError::from_status(StatusCode::NOT_FOUND, None),
            RepositoryError::NotFound
        ));
        assert!(matches!(
            RepositoryError::from_status(StatusCode::BAD_GATEWAY, None),
            RepositoryError::Server(502)
        ));
        assert!(matches!(
            RepositoryError::from_status(StatusCode::CONFLICT, None),
            RepositoryError::Unexpected(_)
        ));
    }

    #[test]
    fn validation_keeps_server_message() {
        let err = RepositoryError::from_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            Some("The topic field is required.".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "Validation error: The topic field is required."
        );
    }

    #[test]
    fn only_transport_and_server_failures_are_retryable() {
        assert!(RepositoryError::Network("reset".into()).is_retryable());
        assert!(RepositoryError::Server(503).is_retryable());
        assert!(!RepositoryError::Validation("bad".into()).is_retryable());
        assert!(!RepositoryError::Permission.is_retryable());
        assert!(!RepositoryError::NotFound.is_retryable());
        assert!(!RepositoryError::Unexpected("?".into()).is_retryable());
    }
}
