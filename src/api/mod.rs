use crate::{
    auth::TokenIssuer,
    store::{CredentialStore, UserStore},
};
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    Extension, Router,
};
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

pub mod error;
pub mod handlers;
pub mod validation;
// OpenAPI router wiring and route registration live in openapi.rs.
mod openapi;

pub use openapi::openapi;

pub const DOCS_PATH: &str = "/api-docs";
pub const OPENAPI_JSON_PATH: &str = "/openapi.json";

const REQUEST_ID: &str = "x-request-id";

/// Build the API router with all documented routes registered.
#[must_use]
pub fn router() -> OpenApiRouter {
    openapi::api_router()
}

/// Stores and token issuer shared by every handler.
///
/// Each [`app`] call layers its own clones of these `Arc`s, so tests get
/// isolated state by building a fresh `AppState`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub users: Arc<UserStore>,
    pub credentials: Arc<CredentialStore>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    #[must_use]
    pub fn new(tokens: TokenIssuer) -> Self {
        Self {
            users: Arc::new(UserStore::new()),
            credentials: Arc::new(CredentialStore::new()),
            tokens: Arc::new(tokens),
        }
    }
}

/// Assemble the full application: documented routes, Swagger UI and middleware.
pub fn app(state: &AppState, cors: CorsLayer) -> Router {
    let (router, openapi) = router().split_for_parts();

    router
        .merge(SwaggerUi::new(DOCS_PATH).url(OPENAPI_JSON_PATH, openapi))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(REQUEST_ID),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(state.users.clone()))
                .layer(Extension(state.credentials.clone()))
                .layer(Extension(state.tokens.clone())),
        )
}

/// CORS restricted to `origins`; an empty list allows no cross-origin callers.
#[must_use]
pub fn cors(origins: &[HeaderValue]) -> CorsLayer {
    CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_origin(AllowOrigin::list(origins.iter().cloned()))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, state: AppState, origins: &[String]) -> Result<()> {
    let origins = origins
        .iter()
        .map(|origin| parse_origin(origin))
        .collect::<Result<Vec<_>>>()?;

    let app = app(&state, cors(&origins));

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);
    info!("API documentation at {}", DOCS_PATH);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {err}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => tracing::error!("Failed to listen for SIGTERM: {err}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID)
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

/// Normalize an allowed origin (`scheme://host[:port]`) into a header value.
///
/// # Errors
/// Returns an error if `origin` is not a URL with a host.
pub fn parse_origin(origin: &str) -> Result<HeaderValue> {
    let parsed =
        Url::parse(origin.trim()).with_context(|| format!("Invalid allowed origin: {origin}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("Allowed origin must include a valid host: {origin}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build allowed origin header")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::to_bytes,
        http::{header::ACCESS_CONTROL_ALLOW_ORIGIN, header::ORIGIN, StatusCode},
    };
    use secrecy::SecretString;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app(origins: &[&str]) -> anyhow::Result<Router> {
        let origins = origins
            .iter()
            .map(|origin| parse_origin(origin))
            .collect::<Result<Vec<_>>>()?;
        let state = AppState::new(TokenIssuer::new(&SecretString::from("s".to_string())));
        Ok(app(&state, cors(&origins)))
    }

    #[test]
    fn parse_origin_normalizes() -> anyhow::Result<()> {
        assert_eq!(parse_origin("http://localhost:3000/")?, "http://localhost:3000");
        assert_eq!(parse_origin("https://users-api.dev/app")?, "https://users-api.dev");
        assert!(parse_origin("not a url").is_err());
        Ok(())
    }

    #[tokio::test]
    async fn hello_and_request_id() -> anyhow::Result<()> {
        let response = test_app(&[])?
            .oneshot(Request::builder().uri("/hello").body(Body::empty())?)
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID));

        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body: Value = serde_json::from_slice(&bytes)?;
        assert_eq!(body, serde_json::json!({"message": "Hello, World!"}));
        Ok(())
    }

    #[tokio::test]
    async fn cors_allows_listed_origins_only() -> anyhow::Result<()> {
        let app = test_app(&["http://localhost:3000"])?;

        let allowed = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/users")
                    .header(ORIGIN, "http://localhost:3000")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(
            allowed.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("http://localhost:3000"))
        );

        let denied = app
            .oneshot(
                Request::builder()
                    .uri("/users")
                    .header(ORIGIN, "http://evil.example")
                    .body(Body::empty())?,
            )
            .await?;
        assert!(denied.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        Ok(())
    }

    #[tokio::test]
    async fn serves_openapi_document() -> anyhow::Result<()> {
        let response = test_app(&[])?
            .oneshot(Request::builder().uri(OPENAPI_JSON_PATH).body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let doc: Value = serde_json::from_slice(&bytes)?;
        assert!(doc["paths"]["/users/{id}"].is_object());
        Ok(())
    }

    #[tokio::test]
    async fn health_reports_store_counts() -> anyhow::Result<()> {
        let response = test_app(&[])?
            .oneshot(Request::builder().uri("/health").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("X-App"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body: Value = serde_json::from_slice(&bytes)?;
        assert_eq!(body["name"], env!("CARGO_PKG_NAME"));
        assert_eq!(body["users"], 0);
        assert_eq!(body["credentials"], 0);
        Ok(())
    }
}
