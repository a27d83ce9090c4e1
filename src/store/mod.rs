pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::fix::GpsFix;
use crate::models::session::SessionId;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed store data: {0}")]
    Malformed(String),

    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    #[error("session {0} is already completed")]
    SessionClosed(SessionId),
}

/// Durable log of timestamped fixes per session.
#[async_trait]
pub trait GpsSampleStore: Send + Sync {
    /// Returns the session's fixes ascending by timestamp. Unknown sessions
    /// have no fixes.
    async fn fetch_fixes(&self, session_id: SessionId) -> Result<Vec<GpsFix>, StoreError>;
}

/// Writable `verified_km` field of the session record.
#[async_trait]
pub trait SessionRecordSink: Send + Sync {
    async fn update_verified_distance(
        &self,
        session_id: SessionId,
        verified_km: f64,
    ) -> Result<(), StoreError>;
}
