//! MarketMind HTTP Server
//!
//! ```text
//! GET  /                -> service status
//! POST /chat            -> provider A, prompt by mode
//! POST /campaign        -> provider B, campaign prompt
//! POST /pitch           -> provider A, pitch prompt
//! POST /score-lead      -> provider B, leads prompt
//! POST /analyze-market  -> provider A, chat prompt
//! ```
//!
//! Provider failures are mapped to `500 {"detail": ...}` here and nowhere
//! else. Bodies that fail to deserialize never reach the router and get
//! `422 {"detail": ...}`; unknown paths and methods get 404/405 in the
//! same shape.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::providers::ProviderError;
use crate::router::{ChatRequest, CompletionResult, LeadRequest, LeadScoreResult, PromptRouter};

pub const SERVICE_STATUS: &str = "MarketMind API running ✅";
pub const API_VERSION: &str = "1.0";

// ============================================================================
// STATE
// ============================================================================

pub struct ApiState {
    pub router: PromptRouter,
}

impl ApiState {
    pub fn new(router: PromptRouter) -> Self {
        Self { router }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Upstream(#[from] ProviderError),

    #[error("{0}")]
    InvalidBody(String),

    #[error("Not Found")]
    NotFound,

    #[error("Method Not Allowed")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ============================================================================
// JSON BODY EXTRACTOR
// ============================================================================

/// JSON request body that is parsed even when `Content-Type` is absent.
///
/// Only an explicit non-JSON content type is refused.
pub struct JsonBody<T>(pub T);

fn is_json_content_type(value: &HeaderValue) -> bool {
    let Ok(value) = value.to_str() else {
        return false;
    };
    let mime = value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(content_type) = req.headers().get(header::CONTENT_TYPE) {
            if !is_json_content_type(content_type) {
                return Err(ApiError::InvalidBody(format!(
                    "Expected a JSON body, got Content-Type {:?}",
                    content_type.to_str().unwrap_or("<non-ascii>")
                )));
            }
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::InvalidBody(format!("Invalid JSON body: {}", e)))?;
        Ok(Self(value))
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
}

pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: SERVICE_STATUS.to_string(),
        version: API_VERSION.to_string(),
    })
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// POST /chat
pub async fn chat(
    State(state): State<Arc<ApiState>>,
    JsonBody(req): JsonBody<ChatRequest>,
) -> ApiResult<CompletionResult> {
    let result = state.router.chat(&req.message, &req.mode).await?;
    Ok(Json(result))
}

/// POST /campaign
pub async fn generate_campaign(
    State(state): State<Arc<ApiState>>,
    JsonBody(req): JsonBody<ChatRequest>,
) -> ApiResult<CompletionResult> {
    let result = state.router.generate_campaign(&req.message).await?;
    Ok(Json(result))
}

/// POST /pitch
pub async fn generate_pitch(
    State(state): State<Arc<ApiState>>,
    JsonBody(req): JsonBody<ChatRequest>,
) -> ApiResult<CompletionResult> {
    let result = state.router.generate_pitch(&req.message).await?;
    Ok(Json(result))
}

/// POST /score-lead
pub async fn score_lead(
    State(state): State<Arc<ApiState>>,
    JsonBody(lead): JsonBody<LeadRequest>,
) -> ApiResult<LeadScoreResult> {
    let result = state.router.score_lead(lead).await?;
    Ok(Json(result))
}

/// POST /analyze-market
pub async fn analyze_market(
    State(state): State<Arc<ApiState>>,
    JsonBody(req): JsonBody<ChatRequest>,
) -> ApiResult<CompletionResult> {
    let result = state.router.analyze_market(&req.message).await?;
    Ok(Json(result))
}

// ============================================================================
// SERVER STARTUP
// ============================================================================

pub fn build_app(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(root).fallback(method_not_allowed))
        .route("/chat", post(chat).fallback(method_not_allowed))
        .route(
            "/campaign",
            post(generate_campaign).fallback(method_not_allowed),
        )
        .route("/pitch", post(generate_pitch).fallback(method_not_allowed))
        .route("/score-lead", post(score_lead).fallback(method_not_allowed))
        .route(
            "/analyze-market",
            post(analyze_market).fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}

pub async fn run_server(config: AppConfig, host: &str, port: u16) -> anyhow::Result<()> {
    let router = PromptRouter::from_config(&config)?;
    let app = build_app(Arc::new(ApiState::new(router)));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("╔══════════════════════════════════════════════════════════════╗");
    info!("║                   MarketMind API v{:<27}║", API_VERSION);
    info!("╠══════════════════════════════════════════════════════════════╣");
    info!("║  Listening on: {:45} ║", addr);
    info!("║  Provider A:   {:45} ║", config.gemini.api_base);
    info!("║  Provider B:   {:45} ║", config.groq.api_base);
    info!("╠══════════════════════════════════════════════════════════════╣");
    info!("║  Endpoints:                                                  ║");
    info!("║    GET  /               - Service status                     ║");
    info!("║    POST /chat           - Chat (mode-selected prompt)        ║");
    info!("║    POST /campaign       - Campaign generator                 ║");
    info!("║    POST /pitch          - Sales pitch writer                 ║");
    info!("║    POST /score-lead     - Lead scoring                       ║");
    info!("║    POST /analyze-market - Market analysis                    ║");
    info!("╚══════════════════════════════════════════════════════════════╝");

    axum::serve(listener, app).await?;

    Ok(())
}
