use crate::{accounts::AccountService, APP_USER_AGENT};
use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method, Request},
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info, info_span, Span};
use ulid::Ulid;

pub(crate) mod handlers;
mod openapi;

pub use openapi::openapi;

/// Build the application router around `service`.
#[must_use]
pub fn router(service: Arc<AccountService>) -> Router {
    let store = Arc::clone(service.store());

    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any);

    Router::new()
        .route("/", get(|| async { APP_USER_AGENT }))
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(service)),
        )
        .route("/health", get(handlers::health).options(handlers::health))
        .layer(Extension(store))
}

/// Start the server
/// # Errors
/// Return error if failed to bind or serve
pub async fn new(port: u16, service: Arc<AccountService>) -> Result<()> {
    let app = router(service);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gracefully shutdown");

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown"),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        accounts::{password::MIN_BCRYPT_COST, Account},
        store::{AccountStore, SqliteStore, StoreError},
    };
    use anyhow::Context;
    use async_trait::async_trait;
    use axum::{body::to_bytes, http::StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app() -> Result<Router> {
        let store = SqliteStore::connect("sqlite::memory:").await?;
        let service = AccountService::new(Arc::new(store), MIN_BCRYPT_COST).await?;
        Ok(router(Arc::new(service)))
    }

    async fn post_json(app: &Router, uri: &str, body: &str) -> Result<(StatusCode, Value)> {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))?,
            )
            .await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let value = serde_json::from_slice(&bytes).context("response is not JSON")?;
        Ok((status, value))
    }

    #[tokio::test]
    async fn signup_then_login() -> Result<()> {
        let app = app().await?;
        let body = json!({ "email": "a@b.com", "password": "secret1" }).to_string();

        let (status, value) = post_json(&app, "/signup", &body).await?;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(value, json!({ "message": "User registered successfully" }));

        let (status, value) = post_json(&app, "/login", &body).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value, json!({ "message": "Login successful" }));
        Ok(())
    }

    #[tokio::test]
    async fn missing_password_is_bad_request() -> Result<()> {
        let app = app().await?;
        let body = json!({ "email": "a@b.com" }).to_string();

        for uri in ["/signup", "/login"] {
            let (status, value) = post_json(&app, uri, &body).await?;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(value, json!({ "error": "Invalid input" }));
        }
        Ok(())
    }

    #[tokio::test]
    async fn non_json_body_is_bad_request() -> Result<()> {
        let app = app().await?;

        let (status, value) = post_json(&app, "/signup", "email=a@b.com").await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value, json!({ "error": "Invalid input" }));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .body(Body::from(r#"{"email":"a@b.com","password":"x"}"#))?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn request_id_is_generated_and_propagated() -> Result<()> {
        let app = app().await?;

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty())?)
            .await?;
        let generated = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .context("missing x-request-id")?;
        assert!(Ulid::from_string(generated).is_ok());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("x-request-id", "abc123")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(
            response.headers().get("x-request-id"),
            Some(&HeaderValue::from_static("abc123"))
        );
        Ok(())
    }

    /// Lookups and pings fail as if the database went away.
    struct UnreachableStore;

    #[async_trait]
    impl AccountStore for UnreachableStore {
        async fn find_by_email(&self, _email: &str) -> Result<Option<Account>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn insert(&self, _account: Account) -> Result<(), StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        fn kind(&self) -> &'static str {
            "unreachable"
        }
    }

    #[tokio::test]
    async fn unreadable_store_is_internal_error() -> Result<()> {
        let service = AccountService::new(Arc::new(UnreachableStore), MIN_BCRYPT_COST).await?;
        let app = router(Arc::new(service));
        let body = json!({ "email": "a@b.com", "password": "secret1" }).to_string();

        let (status, value) = post_json(&app, "/login", &body).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(value, json!({ "error": "Error reading user" }));

        let (status, value) = post_json(&app, "/signup", &body).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(value, json!({ "error": "Error reading user" }));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        Ok(())
    }

    #[tokio::test]
    async fn health_reports_store() -> Result<()> {
        let app = app().await?;

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("X-App"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let value: Value = serde_json::from_slice(&bytes)?;
        assert_eq!(value["store"], "ok");
        assert_eq!(value["name"], env!("CARGO_PKG_NAME"));

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/health")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        assert!(bytes.is_empty());
        Ok(())
    }
}
