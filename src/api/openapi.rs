#![allow(clippy::needless_for_each)]

use super::handlers::{self, health::Health, ErrorBody, Message};
use crate::accounts::Credentials;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::health::health, handlers::signup::signup, handlers::login::login),
    components(schemas(Credentials, Message, ErrorBody, Health)),
    tags(
        (name = "accounts", description = "Signup and login"),
        (name = "health", description = "Store readiness")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
