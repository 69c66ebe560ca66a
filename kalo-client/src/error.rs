use crate::token::TokenError;

/// Errors surfaced by [`crate::api_client::ApiClient`]. Every failed request
/// collapses into one of these after the fallback machinery has run.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("network error: {message}")]
    Connectivity {
        message: String,
        connect: bool,
        timeout: bool,
    },

    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("unauthorized: {message}")]
    Auth {
        status: u16,
        message: String,
        auth_endpoint: bool,
    },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("{message}")]
    Validation { status: u16, message: String },

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("session storage error: {message}")]
    Storage { message: String },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Connectivity { .. } => None,
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Auth { status, .. } => Some(*status),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Validation { status, .. } => Some(*status),
            ApiError::Token(_) => None,
            ApiError::Storage { .. } => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Connectivity { message, .. } => message.clone(),
            ApiError::Server { message, .. } => message.clone(),
            ApiError::Auth { message, .. } => message.clone(),
            ApiError::NotFound { message } => message.clone(),
            ApiError::Validation { message, .. } => message.clone(),
            ApiError::Token(err) => err.to_string(),
            ApiError::Storage { message } => message.clone(),
        }
    }
}
