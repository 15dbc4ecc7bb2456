use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{result::error_codes, session::SignInError};

/// Why a presented token was refused.
///
/// The kinds exist for diagnostics. Callers collapse all of them into
/// "not authenticated" before anything reaches the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token has expired")]
    Expired,
}

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("token claims must serialize to a JSON object")]
    NotAnObject,
    #[error("token validity must be at least one millisecond")]
    NonPositiveValidity,
    #[error("token expiry is out of range")]
    ExpiryOverflow,
    #[error("failed to serialize token claims: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug)]
pub enum AppError {
    Unauthorized,
    InvalidCredentials,
    BadRequest(String),
    InternalServerError,
}

#[derive(Serialize)]
struct ErrorResponse {
    code: i32,
    error_message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error_message) = match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                error_codes::AUTH_FAILED,
                "लॉगिन जरूरी है।".to_string(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                error_codes::AUTH_FAILED,
                "गलत कक्षा, रोल नंबर या पासवर्ड।".to_string(),
            ),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR, msg)
            }
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
                "त्रुटि।".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            code,
            error_message,
        });

        (status, body).into_response()
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        tracing::debug!("rejected token: {}", err);
        AppError::Unauthorized
    }
}

impl From<IssueError> for AppError {
    fn from(err: IssueError) -> Self {
        tracing::error!("failed to issue token: {}", err);
        AppError::InternalServerError
    }
}

impl From<SignInError> for AppError {
    fn from(err: SignInError) -> Self {
        match err {
            SignInError::InvalidCredentials => AppError::InvalidCredentials,
            SignInError::AccountExists | SignInError::Password(_) => {
                AppError::BadRequest(err.to_string())
            }
            SignInError::Issue(err) => err.into(),
        }
    }
}
