pub mod health;
pub use self::health::health;

pub mod signup;
pub use self::signup::signup;

pub mod login;
pub use self::login::login;

// common types for the handlers
use crate::accounts::AccountError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

/// Success body: `{"message": "..."}`.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Message {
    message: String,
}

impl Message {
    #[must_use]
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Failure body: `{"error": "..."}`.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    error: String,
}

impl ErrorBody {
    #[must_use]
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidInput => (StatusCode::BAD_REQUEST, "Invalid input"),
            Self::EmailTaken => (StatusCode::CONFLICT, "Email already exists"),
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid email or password"),
            Self::InvalidCost(_) | Self::Hashing(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Error hashing password")
            }
            Self::Save(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Error saving user"),
            Self::Lookup(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Error reading user"),
        };

        if status.is_server_error() {
            error!("{}", self);
        }

        (status, Json(ErrorBody::new(message))).into_response()
    }
}
