use super::{ErrorBody, Message};
use crate::accounts::{AccountError, AccountService, Credentials};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, instrument};

#[utoipa::path(
    post,
    path= "/signup",
    request_body = Credentials,
    responses (
        (status = 201, description = "User registered successfully", body = Message, content_type = "application/json"),
        (status = 400, description = "Missing or empty email or password", body = ErrorBody),
        (status = 409, description = "Email already exists", body = ErrorBody),
        (status = 500, description = "Error hashing password or saving user", body = ErrorBody),
    ),
    tag= "accounts"
)]
// axum handler for signup
#[instrument(skip_all)]
pub async fn signup(
    service: Extension<Arc<AccountService>>,
    payload: Option<Json<Credentials>>,
) -> Response {
    let Some(Json(credentials)) = payload else {
        debug!("Missing or malformed payload");
        return AccountError::InvalidInput.into_response();
    };

    match service.register(credentials).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(Message::new("User registered successfully")),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
