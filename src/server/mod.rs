//! HTTP boundary: `POST /api/qr/generate` and `GET /api/qr/health`.

pub mod config;
pub mod error;
pub mod types;

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Request, State},
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::pipeline::{Pipeline, QrRequest};
use config::Config;
use error::ApiError;
use types::{GenerateRequest, GenerateResponse, HealthResponse};

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let pipeline = config.pipeline();
        Self { config: Arc::new(config), pipeline: Arc::new(pipeline) }
    }
}

/// Builds the application router.
pub fn routes(config: Config) -> Router {
    let cors = cors_layer(&config);
    let body_limit = config.body_limit();
    let state = AppState::new(config);

    let qr_routes = Router::new()
        .route("/generate", post(generate))
        .route("/health", get(health));

    Router::new()
        .nest("/api/qr", qr_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "http_request",
                http_request.method = ?request.method(),
                http_request.uri = ?request.uri(),
            )
        }))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Skipping invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok".to_string() })
}

async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(body) = payload?;

    let url = body
        .url
        .clone()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("URL is required".to_string()))?;
    let options = body.options.to_encode_options()?;
    let logo = body.logo().map(str::to_string);
    let size_percent =
        body.options.logo_size_percent.unwrap_or_else(|| state.config.logo_size_percent());
    info!(url_len = url.len(), has_logo = logo.is_some(), "Generating QR code");

    let pipeline = state.pipeline.clone();
    let task = tokio::task::spawn_blocking(move || {
        let request = QrRequest {
            url: &url,
            options,
            logo: logo.as_deref(),
            logo_size_percent: size_percent,
        };
        pipeline.run_to_transport(&request)
    });

    let qr_code = match tokio::time::timeout(state.config.request_timeout(), task).await {
        Ok(Ok(res)) => res?,
        Ok(Err(join_err)) => return Err(ApiError::Internal(join_err.to_string())),
        Err(_) => return Err(ApiError::Timeout),
    };

    Ok(Json(GenerateResponse { success: true, qr_code }))
}
