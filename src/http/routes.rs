//! HTTP route definitions

use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing::debug;
use uuid::Uuid;

use crate::app::AppState;
use crate::relay::{RaceSession, RaceSnapshot, RelayError, UserId};
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;

/// Upper bound on a single HTTP request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // CORS configuration - support multiple origins (comma-separated in CLIENT_ORIGIN)
    let allowed_origins: Vec<header::HeaderValue> = state
        .config
        .client_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<header::HeaderValue>().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let race_routes = Router::new()
        .route("/create", post(race_create_handler))
        .route("/join", post(race_join_handler))
        .route("/update", post(race_update_handler))
        .route("/:session_id", get(race_get_handler));

    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .nest("/api/games/race", race_routes)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    active_arenas: usize,
    race_sessions: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        active_arenas: state.arena_registry.active_arenas(),
        race_sessions: state.relay.session_count(),
    })
}

// ============================================================================
// Race relay endpoints
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRaceRequest {
    user_id: UserId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRaceResponse {
    session_id: Uuid,
}

async fn race_create_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateRaceRequest>,
) -> Json<CreateRaceResponse> {
    let session_id = state.relay.create_session(req.user_id);
    Json(CreateRaceResponse { session_id })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinRaceRequest {
    session_id: String,
    user_id: UserId,
}

#[derive(Serialize)]
struct JoinRaceResponse {
    success: bool,
    seed: u32,
}

async fn race_join_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<JoinRaceRequest>,
) -> Result<Json<JoinRaceResponse>, AppError> {
    let session_id = parse_session_id(&req.session_id)
        .ok_or_else(|| AppError::BadRequest(RelayError::SessionNotFound.to_string()))?;

    let seed = state
        .relay
        .join_session(&session_id, req.user_id)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    Ok(Json(JoinRaceResponse {
        success: true,
        seed,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRaceRequest {
    session_id: String,
    user_id: UserId,
    x: f32,
    score: f32,
    #[serde(default)]
    avoided: u32,
}

/// Reports for unknown sessions or players are dropped with an empty 204
async fn race_update_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UpdateRaceRequest>,
) -> Result<Response, AppError> {
    let Some(session_id) = parse_session_id(&req.session_id) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    match state
        .relay
        .update_player(&session_id, &req.user_id, req.x, req.score, req.avoided)
    {
        Ok(snapshot) => Ok(Json::<RaceSnapshot>(snapshot).into_response()),
        Err(RelayError::SessionNotFound | RelayError::PlayerNotFound) => {
            debug!(session_id = %session_id, user_id = %req.user_id, "Dropped race update");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        Err(e) => Err(AppError::BadRequest(e.to_string())),
    }
}

async fn race_get_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<RaceSession>, AppError> {
    parse_session_id(&session_id)
        .and_then(|id| state.relay.get_session(&id))
        .map(Json)
        .ok_or_else(|| AppError::NotFound(RelayError::SessionNotFound.to_string()))
}

fn parse_session_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

// ============================================================================
// Error handling
// ============================================================================

/// JSON body extractor that reports bad bodies as `AppError`
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
struct ApiJson<T>(T);

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
