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
    path= "/login",
    request_body = Credentials,
    responses (
        (status = 200, description = "Login successful", body = Message, content_type = "application/json"),
        (status = 400, description = "Missing or empty email or password", body = ErrorBody),
        (status = 401, description = "Invalid email or password", body = ErrorBody),
        (status = 500, description = "Error reading user", body = ErrorBody),
    ),
    tag= "accounts"
)]
// axum handler for login
#[instrument(skip_all)]
pub async fn login(
    service: Extension<Arc<AccountService>>,
    payload: Option<Json<Credentials>>,
) -> Response {
    let Some(Json(credentials)) = payload else {
        debug!("Missing or malformed payload");
        return AccountError::InvalidInput.into_response();
    };

    match service.authenticate(credentials).await {
        Ok(()) => (StatusCode::OK, Json(Message::new("Login successful"))).into_response(),
        Err(e) => e.into_response(),
    }
}
