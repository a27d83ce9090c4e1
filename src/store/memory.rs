use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::models::fix::{Coordinates, GpsFix};
use crate::models::session::{Session, SessionId, SessionStatus};
use crate::store::{GpsSampleStore, SessionRecordSink, StoreError};

/// DashMap-backed stand-in for the attendance and gps log tables.
pub struct InMemoryStore {
    sessions: DashMap<SessionId, Session>,
    fixes: DashMap<SessionId, Vec<GpsFix>>,
    next_id: AtomicI64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            fixes: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn start_session(&self, user_id: String, coordinates: Coordinates) -> Session {
        let now = Utc::now();
        let session = Session {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            user_id,
            status: SessionStatus::Active,
            start_time: now,
            end_time: None,
            start_coordinates: coordinates,
            end_coordinates: None,
            verified_km: 0.0,
            created_at: now,
        };

        self.sessions.insert(session.id, session.clone());
        session
    }

    pub fn get_session(&self, session_id: SessionId) -> Option<Session> {
        self.sessions
            .get(&session_id)
            .map(|entry| entry.value().clone())
    }

    /// Appends a fix to an active session.
    pub fn record_fix(&self, session_id: SessionId, fix: GpsFix) -> Result<GpsFix, StoreError> {
        let session = self
            .sessions
            .get(&session_id)
            .ok_or(StoreError::SessionNotFound(session_id))?;

        if session.status != SessionStatus::Active {
            return Err(StoreError::SessionClosed(session_id));
        }

        self.fixes.entry(session_id).or_default().push(fix.clone());
        Ok(fix)
    }

    pub fn complete_session(
        &self,
        session_id: SessionId,
        coordinates: Coordinates,
        ended_at: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        let mut session = self
            .sessions
            .get_mut(&session_id)
            .ok_or(StoreError::SessionNotFound(session_id))?;

        if session.status == SessionStatus::Completed {
            return Err(StoreError::SessionClosed(session_id));
        }

        session.status = SessionStatus::Completed;
        session.end_time = Some(ended_at);
        session.end_coordinates = Some(coordinates);

        Ok(session.clone())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn active_session_count(&self) -> usize {
        self.sessions
            .iter()
            .filter(|entry| entry.value().status == SessionStatus::Active)
            .count()
    }

    pub fn fix_count(&self) -> usize {
        self.fixes.iter().map(|entry| entry.value().len()).sum()
    }
}

#[async_trait]
impl GpsSampleStore for InMemoryStore {
    async fn fetch_fixes(&self, session_id: SessionId) -> Result<Vec<GpsFix>, StoreError> {
        let mut fixes = self
            .fixes
            .get(&session_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        // stable, so fixes sharing a timestamp keep arrival order
        fixes.sort_by_key(|fix| fix.timestamp);
        Ok(fixes)
    }
}

#[async_trait]
impl SessionRecordSink for InMemoryStore {
    async fn update_verified_distance(
        &self,
        session_id: SessionId,
        verified_km: f64,
    ) -> Result<(), StoreError> {
        let mut session = self
            .sessions
            .get_mut(&session_id)
            .ok_or(StoreError::SessionNotFound(session_id))?;

        session.verified_km = verified_km;
        Ok(())
    }
}
