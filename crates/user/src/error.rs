//! User directory error types.

use service_kit::ApiError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    #[error("{0}")]
    Validation(String),

    #[error("user with this email already exists.")]
    DuplicateEmail,

    #[error("A user with that username already exists.")]
    DuplicateUsername,

    #[error("Email and password are required.")]
    MissingCredentials,

    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("Refresh token is required.")]
    MissingRefreshToken,

    #[error("Invalid refresh token.")]
    InvalidRefreshToken,

    #[error("Given token not valid.")]
    InvalidToken,

    #[error("User not found.")]
    NotFound,
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidCredentials
            | UserError::InvalidRefreshToken
            | UserError::InvalidToken => ApiError::Unauthorized(err.to_string()),
            UserError::NotFound => ApiError::NotFound(err.to_string()),
            UserError::Validation(_)
            | UserError::DuplicateEmail
            | UserError::DuplicateUsername
            | UserError::MissingCredentials
            | UserError::MissingRefreshToken => ApiError::BadRequest(err.to_string()),
        }
    }
}
