mod login;
mod summary;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use wbdash_core::SummaryCache;

use crate::{
    middleware::{
        enforce_rate_limit, request_id, require_session_api, require_session_page,
        RateLimitState, RequestId,
    },
    session::SessionState,
};

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<SummaryCache>,
    pub session: SessionState,
    pub static_dir: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    updated_at: Option<DateTime<Utc>>,
}

impl ResponseMeta {
    fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

/// JSON endpoints: 401 when the session is missing. Only authenticated
/// requests count against the rate limit.
fn api_router(session: SessionState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/summary", get(summary::get_summary))
        .route("/supplies", get(summary::get_supplies))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    session,
                    require_session_api,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                )),
        )
}

/// Dashboard page: redirect to `/login` when the session is missing.
fn page_router(
    session: SessionState,
    rate_limit: RateLimitState,
    static_dir: &std::path::Path,
) -> Router<AppState> {
    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    session,
                    require_session_page,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                )),
        )
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/login", get(login::login_form).post(login::login))
        .route("/logout", get(login::logout))
        .route_service(
            "/favicon.ico",
            ServeFile::new(state.static_dir.join("favicon.ico")),
        )
        .nest_service("/static", ServeDir::new(&state.static_dir));

    Router::new()
        .merge(public_routes)
        .merge(api_router(state.session.clone(), rate_limit.clone()))
        .merge(page_router(
            state.session.clone(),
            rate_limit,
            &state.static_dir,
        ))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthData {
        status: "ok",
        updated_at: state.cache.updated_at(),
    })
}

async fn not_found(Extension(req_id): Extension<RequestId>) -> ApiError {
    ApiError::new(req_id.0, "not_found", "no such route")
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "../api_test.rs"]
mod tests;
