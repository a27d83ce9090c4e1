use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::verification::{verify_session, VerificationOutcome};
use crate::error::AppError;
use crate::models::fix::{Coordinates, GpsFix};
use crate::models::session::{Session, SessionId};
use crate::state::AppState;
use crate::store::memory::InMemoryStore;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/attendance", post(start_session))
        .route("/attendance/:id", get(get_session))
        .route("/attendance/:id/gps", post(record_fix))
        .route("/attendance/:id/end", post(end_session))
}

#[derive(Deserialize)]
pub struct StartSessionRequest {
    pub user_id: String,
    pub coordinates: Coordinates,
}

#[derive(Deserialize)]
pub struct RecordFixRequest {
    pub coordinates: Coordinates,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct EndSessionRequest {
    pub coordinates: Coordinates,
}

#[derive(Serialize)]
pub struct EndSessionResponse {
    pub session: Session,
    pub verification: EndVerification,
}

/// Verification result reported with a closed session. A failure carries the
/// same `{ error, code }` pair the verification endpoint would return.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum EndVerification {
    Completed(VerificationOutcome),
    Failed { error: String, code: &'static str },
}

impl From<Result<VerificationOutcome, AppError>> for EndVerification {
    fn from(result: Result<VerificationOutcome, AppError>) -> Self {
        match result {
            Ok(outcome) => EndVerification::Completed(outcome),
            Err(err) => EndVerification::Failed {
                error: err.to_string(),
                code: err.code(),
            },
        }
    }
}

fn ledger(state: &AppState) -> Result<&InMemoryStore, AppError> {
    state
        .ledger
        .as_deref()
        .ok_or_else(|| AppError::Internal("attendance ledger is not configured".to_string()))
}

fn validate_coordinates(coordinates: &Coordinates) -> Result<(), AppError> {
    if coordinates.is_valid() {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "coordinates out of range: ({}, {})",
            coordinates.latitude, coordinates.longitude
        )))
    }
}

async fn start_session(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<Json<Session>, AppError> {
    if payload.user_id.trim().is_empty() {
        return Err(AppError::BadRequest("user_id cannot be empty".to_string()));
    }
    validate_coordinates(&payload.coordinates)?;

    let session = ledger(&state)?.start_session(payload.user_id, payload.coordinates);

    info!(attendance_id = session.id, user_id = %session.user_id, "session started");
    Ok(Json(session))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Json<Session>, AppError> {
    let session = ledger(&state)?
        .get_session(id)
        .ok_or_else(|| AppError::NotFound(format!("session {} not found", id)))?;

    Ok(Json(session))
}

async fn record_fix(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
    Json(payload): Json<RecordFixRequest>,
) -> Result<Json<GpsFix>, AppError> {
    validate_coordinates(&payload.coordinates)?;

    let fix = GpsFix {
        timestamp: payload.timestamp.unwrap_or_else(Utc::now),
        coordinates: payload.coordinates,
    };

    let fix = ledger(&state)?.record_fix(id, fix)?;
    Ok(Json(fix))
}

/// Closes the session, then runs verification once. A failed verification
/// leaves the session completed and is reported with its error code.
async fn end_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
    Json(payload): Json<EndSessionRequest>,
) -> Result<Json<EndSessionResponse>, AppError> {
    validate_coordinates(&payload.coordinates)?;

    ledger(&state)?.complete_session(id, payload.coordinates, Utc::now())?;
    info!(attendance_id = id, "session completed");

    let result = verify_session(&state, id).await;
    if let Err(err) = &result {
        warn!(attendance_id = id, error = %err, "session closed without verified distance");
    }

    let session = ledger(&state)?
        .get_session(id)
        .ok_or_else(|| AppError::NotFound(format!("session {} not found", id)))?;

    Ok(Json(EndSessionResponse {
        session,
        verification: result.into(),
    }))
}
