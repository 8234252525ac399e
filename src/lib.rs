//! Local Tours and Guides is the booking API behind a tours marketplace.

#![forbid(unsafe_code)]
pub mod config;
pub mod database;
pub mod error;
mod middleware;
mod router;
pub mod telemetry;
pub mod token;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::routing::{get, post};
use axum::{Router, middleware as AxumMiddleware};
use error::ServerError;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    token: Option<&str>,
    app: Router,
    method: Method,
    path: &str,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    let mut request = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        request = request.header(
            header::COOKIE,
            format!("{}={token}", middleware::TOKEN_COOKIE),
        );
    }

    app.oneshot(request.body(axum::body::Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub db: database::Database,
    pub token: token::TokenManager,
}

fn cors(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            },
        })
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        // Browsers only send the token cookie to explicitly listed origins.
        layer.allow_origin(origins).allow_credentials(true)
    }
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_secs(10)))
        // Remove sensitive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([
            header::AUTHORIZATION,
            header::COOKIE,
            header::SET_COOKIE,
        ]))
        .layer(cors(&state.config.allowed_origins));

    Router::new()
        // `GET /` answers while the server is up.
        .route("/", get(router::status::alive))
        .route("/status.json", get(router::status::status))
        .nest("/services", router::services::router())
        .nest("/bookings", router::bookings::router(state.clone()))
        // `POST /jwt` sets the token cookie, `POST /logOut` clears it.
        .route("/jwt", post(router::jwt::issue))
        .route("/logOut", post(router::jwt::log_out))
        .with_state(state)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state(
    config: Arc<config::Configuration>,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let token = token::TokenManager::new(config.access_token_secret.as_deref())?;

    let db = match config.mongodb {
        Some(ref mongodb) => {
            database::Database::mongo(
                &mongodb.host,
                &mongodb.username,
                &mongodb.password,
                &mongodb.database,
            )
            .await?
        },
        None => {
            tracing::warn!("missing `DB_USER` or `DB_PASSWORD`, data is kept in memory");
            database::Database::memory()
        },
    };

    Ok(AppState { config, db, token })
}
