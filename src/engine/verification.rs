use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::engine::distance::estimate_distance;
use crate::error::AppError;
use crate::models::fix::GpsFix;
use crate::models::session::SessionId;
use crate::state::AppState;
use crate::store::StoreError;

pub const INSUFFICIENT_DATA_MESSAGE: &str = "Insufficient GPS data points";
const MISSING_ID_MESSAGE: &str = "attendance_id is required";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VerificationOutcome {
    Verified {
        success: bool,
        verified_km: f64,
        gps_points: usize,
    },
    Insufficient {
        verified_km: f64,
        message: String,
    },
}

/// Accepts a positive integer, or a string holding one. Absent, null, empty
/// string and the number zero count as missing; a string `"0"` is present but
/// names no session, so it is invalid.
pub fn parse_attendance_id(raw: Option<&Value>) -> Result<SessionId, AppError> {
    let missing = || AppError::BadRequest(MISSING_ID_MESSAGE.to_string());
    let invalid = |value: &Value| AppError::BadRequest(format!("invalid attendance_id: {value}"));

    let value = match raw {
        None | Some(Value::Null) | Some(Value::Bool(false)) => return Err(missing()),
        Some(value) => value,
    };

    let id = match value {
        Value::Number(number) => match number.as_i64() {
            Some(0) => return Err(missing()),
            Some(id) => id,
            None => return Err(invalid(value)),
        },
        Value::String(text) if text.trim().is_empty() => return Err(missing()),
        Value::String(text) => text.trim().parse::<i64>().map_err(|_| invalid(value))?,
        _ => return Err(invalid(value)),
    };

    if id > 0 { Ok(id) } else { Err(invalid(value)) }
}

/// Validates the raw identifier before touching any collaborator.
pub async fn verify_request(
    state: &AppState,
    raw_id: Option<&Value>,
) -> Result<VerificationOutcome, AppError> {
    let session_id = match parse_attendance_id(raw_id) {
        Ok(id) => id,
        Err(err) => {
            warn!(error = %err, "rejected verification request");
            state.metrics.observe_verification(err.code(), 0.0);
            return Err(err);
        }
    };

    verify_session(state, session_id).await
}

/// Fetches the session's fixes, estimates the distance and persists it.
///
/// Safe to run more than once per session: the result depends only on the
/// fix set read, so a repeat overwrites the record with the same value. A
/// fix appended between two runs is picked up by the later one.
pub async fn verify_session(
    state: &AppState,
    session_id: SessionId,
) -> Result<VerificationOutcome, AppError> {
    let start = Instant::now();
    let result = run_verification(state, session_id).await;
    let elapsed = start.elapsed().as_secs_f64();

    match &result {
        Ok(VerificationOutcome::Verified { .. }) => {
            state.metrics.observe_verification("verified", elapsed);
        }
        Ok(VerificationOutcome::Insufficient { .. }) => {
            state.metrics.observe_verification("insufficient", elapsed);
        }
        Err(err) => {
            state.metrics.observe_verification(err.code(), elapsed);
            error!(attendance_id = session_id, error = %err, "failed to verify session distance");
        }
    }

    result
}

async fn run_verification(
    state: &AppState,
    session_id: SessionId,
) -> Result<VerificationOutcome, AppError> {
    let fixes = state
        .gps_store
        .fetch_fixes(session_id)
        .await
        .map_err(AppError::DataFetch)?;
    ensure_well_formed(&fixes).map_err(AppError::DataFetch)?;

    let estimate = estimate_distance(&fixes, &state.distance);

    if estimate.insufficient {
        info!(
            attendance_id = session_id,
            gps_points = fixes.len(),
            "not enough gps fixes to verify distance"
        );
        return Ok(VerificationOutcome::Insufficient {
            verified_km: 0.0,
            message: INSUFFICIENT_DATA_MESSAGE.to_string(),
        });
    }

    state
        .metrics
        .segments_total
        .with_label_values(&["accepted"])
        .inc_by(estimate.segments_accepted as u64);
    state
        .metrics
        .segments_total
        .with_label_values(&["discarded"])
        .inc_by(estimate.segments_discarded as u64);

    state
        .session_sink
        .update_verified_distance(session_id, estimate.verified_km)
        .await
        .map_err(AppError::Persistence)?;

    state.metrics.verified_km.observe(estimate.verified_km);

    info!(
        attendance_id = session_id,
        verified_km = estimate.verified_km,
        gps_points = fixes.len(),
        segments_discarded = estimate.segments_discarded,
        "verified distance persisted"
    );

    Ok(VerificationOutcome::Verified {
        success: true,
        verified_km: estimate.verified_km,
        gps_points: fixes.len(),
    })
}

fn ensure_well_formed(fixes: &[GpsFix]) -> Result<(), StoreError> {
    match fixes.iter().find(|fix| !fix.coordinates.is_valid()) {
        Some(fix) => Err(StoreError::Malformed(format!(
            "fix at {} has out-of-range coordinates ({}, {})",
            fix.timestamp, fix.coordinates.latitude, fix.coordinates.longitude
        ))),
        None => Ok(()),
    }
}
