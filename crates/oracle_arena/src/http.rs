//! REST API over the session store.
//!
//! Un-prefixed routes act on the default session; `/sessions/{id}/...`
//! routes act on keyed sessions. Every success returns a [`Snapshot`].

use crate::error::{ArenaError, ArenaErrorKind};
use crate::snapshot::Snapshot;
use crate::store::SessionStore;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Body of a move request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Cell index (0-8, row-major).
    #[serde(alias = "position")]
    pub index: usize,
}

/// Body of a create-session request. The id is generated when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    /// Requested session id.
    #[serde(default)]
    pub id: Option<String>,
}

/// Error body returned with every non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable reason.
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for ArenaError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ArenaErrorKind::InvalidMove(_) | ArenaErrorKind::IllegalAutomatedTurn(_) => {
                StatusCode::BAD_REQUEST
            }
            ArenaErrorKind::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ArenaErrorKind::SessionExists(_) | ArenaErrorKind::ReservedSession(_) => {
                StatusCode::CONFLICT
            }
        };
        error_response(status, self.kind().to_string())
    }
}

type ApiResult = Result<Json<Snapshot>, Response>;

fn parse_move(payload: Result<Json<MoveRequest>, JsonRejection>) -> Result<usize, Response> {
    match payload {
        Ok(Json(req)) => Ok(req.index),
        Err(rejection) => {
            warn!(error = %rejection, "Rejected move body");
            Err(error_response(StatusCode::BAD_REQUEST, "Invalid position"))
        }
    }
}

/// Builds the router.
pub fn router(store: SessionStore) -> Router {
    Router::new()
        .route("/state", get(get_state))
        .route("/move", post(post_move))
        .route("/reset", post(post_reset))
        .route("/automated_move", post(post_automated_move))
        .route("/sessions", get(list_sessions).post(create_session))
        .route("/sessions/{id}", get(get_session_state).delete(delete_session))
        .route("/sessions/{id}/state", get(get_session_state))
        .route("/sessions/{id}/move", post(post_session_move))
        .route("/sessions/{id}/reset", post(post_session_reset))
        .route("/sessions/{id}/automated_move", post(post_session_automated_move))
        .with_state(store)
}

/// GET /state
#[instrument(skip(store))]
async fn get_state(State(store): State<SessionStore>) -> Json<Snapshot> {
    Json(store.get())
}

/// POST /move
#[instrument(skip(store, payload))]
async fn post_move(
    State(store): State<SessionStore>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> ApiResult {
    let index = parse_move(payload)?;
    debug!(index, "Processing move");
    store
        .with_default(|s| s.submit_human_move(index))
        .map(Json)
        .map_err(IntoResponse::into_response)
}

/// POST /reset
#[instrument(skip(store))]
async fn post_reset(State(store): State<SessionStore>) -> Json<Snapshot> {
    Json(store.reset())
}

/// POST /automated_move
#[instrument(skip(store))]
async fn post_automated_move(State(store): State<SessionStore>) -> ApiResult {
    store
        .with_default(|s| s.submit_automated_move())
        .map(Json)
        .map_err(IntoResponse::into_response)
}

/// GET /sessions
#[instrument(skip(store))]
async fn list_sessions(State(store): State<SessionStore>) -> Json<Vec<String>> {
    Json(store.list())
}

/// POST /sessions
#[instrument(skip(store, body))]
async fn create_session(State(store): State<SessionStore>, body: Bytes) -> Response {
    let req = if body.is_empty() {
        CreateSessionRequest::default()
    } else {
        match serde_json::from_slice::<CreateSessionRequest>(&body) {
            Ok(req) => req,
            Err(e) => {
                warn!(error = %e, "Rejected create-session body");
                return error_response(StatusCode::BAD_REQUEST, "Invalid session request");
            }
        }
    };

    let result = match req.id {
        Some(id) => store.create(id),
        None => Ok(store.create_generated()),
    };

    match result {
        Ok(snapshot) => (StatusCode::CREATED, Json(snapshot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /sessions/{id}
#[instrument(skip(store))]
async fn get_session_state(
    State(store): State<SessionStore>,
    Path(id): Path<String>,
) -> Result<Json<Snapshot>, ArenaError> {
    store.get_session(&id).map(Json)
}

/// DELETE /sessions/{id}
#[instrument(skip(store))]
async fn delete_session(
    State(store): State<SessionStore>,
    Path(id): Path<String>,
) -> Result<Json<Snapshot>, ArenaError> {
    store.drop_session(&id).map(Json)
}

/// POST /sessions/{id}/move
#[instrument(skip(store, payload))]
async fn post_session_move(
    State(store): State<SessionStore>,
    Path(id): Path<String>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> ApiResult {
    let index = parse_move(payload)?;
    store
        .with_session(&id, |s| s.submit_human_move(index))
        .and_then(|result| result)
        .map(Json)
        .map_err(IntoResponse::into_response)
}

/// POST /sessions/{id}/reset
#[instrument(skip(store))]
async fn post_session_reset(
    State(store): State<SessionStore>,
    Path(id): Path<String>,
) -> Result<Json<Snapshot>, ArenaError> {
    store.with_session(&id, |s| s.reset()).map(Json)
}

/// POST /sessions/{id}/automated_move
#[instrument(skip(store))]
async fn post_session_automated_move(
    State(store): State<SessionStore>,
    Path(id): Path<String>,
) -> Result<Json<Snapshot>, ArenaError> {
    store
        .with_session(&id, |s| s.submit_automated_move())
        .and_then(|result| result)
        .map(Json)
}
