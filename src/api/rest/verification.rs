use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::Deserialize;
use serde_json::Value;

use crate::engine::verification::{verify_request, VerificationOutcome};
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/calculate-verified-km", post(calculate_verified_km))
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub attendance_id: Option<Value>,
}

// An unreadable body is reported the same way as a missing id.
async fn calculate_verified_km(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<VerifyRequest>>,
) -> Result<Json<VerificationOutcome>, AppError> {
    let raw_id = payload.as_ref().and_then(|Json(body)| body.attendance_id.as_ref());
    let outcome = verify_request(&state, raw_id).await?;
    Ok(Json(outcome))
}
