//! Form definitions backing the console routes.

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod meetings;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid meeting type")]
    InvalidMeetingType,

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid page size: {0}")]
    InvalidPerPage(String),

    #[error("invalid topic")]
    InvalidTopic,

    #[error("invalid location")]
    InvalidLocation,

    #[error("invalid url")]
    InvalidUrl,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error(transparent)]
    TypeConstraint(#[from] TypeConstraintError),
}
