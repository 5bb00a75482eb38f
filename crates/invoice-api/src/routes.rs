//! Router assembly

use std::any::Any;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::{error, warn};

use invoice_shared::AppConfig;

use crate::dto::MessageResponse;
use crate::error::UNKNOWN_ERROR_MESSAGE;
use crate::handlers;
use crate::middleware::login_rate_limit;
use crate::state::AppState;

/// Transport-level settings for the router.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub allowed_origins: Vec<String>,
    pub body_limit_bytes: usize,
}

impl HttpSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            allowed_origins: config.cors.allowed_origins.clone(),
            body_limit_bytes: config.server.body_limit_bytes,
        }
    }
}

pub fn build_router(state: AppState, settings: &HttpSettings) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route(
            "/login",
            post(handlers::auth::login).layer(middleware::from_fn_with_state(
                state.clone(),
                login_rate_limit,
            )),
        )
        .route("/forgot-password", post(handlers::auth::forgot_password))
        .route("/reset-password", post(handlers::auth::reset_password))
        .route("/test", get(handlers::auth::test_route));

    let invoice_routes =
        Router::new().route("/generate-pdf", post(handlers::invoices::generate_pdf));

    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api/invoices", invoice_routes)
        .fallback(handlers::health::not_found)
        .layer(DefaultBodyLimit::max(settings.body_limit_bytes))
        .layer(cors_layer(&settings.allowed_origins))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "non-string panic payload".to_string()
    };
    error!("Server error: handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(MessageResponse::new(UNKNOWN_ERROR_MESSAGE)),
    )
        .into_response()
}
