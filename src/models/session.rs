use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::fix::Coordinates;

pub type SessionId = i64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

/// Attendance record for one agent work period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub user_id: String,
    pub status: SessionStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub start_coordinates: Coordinates,
    pub end_coordinates: Option<Coordinates>,
    pub verified_km: f64,
    pub created_at: DateTime<Utc>,
}
