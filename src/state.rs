use std::sync::Arc;

use crate::engine::distance::DistanceConfig;
use crate::observability::metrics::Metrics;
use crate::store::memory::InMemoryStore;
use crate::store::{GpsSampleStore, SessionRecordSink};

pub struct AppState {
    /// Backs the attendance routes and both collaborator seams. Absent when
    /// external collaborators are wired in, and the attendance routes go with it.
    pub ledger: Option<Arc<InMemoryStore>>,
    pub gps_store: Arc<dyn GpsSampleStore>,
    pub session_sink: Arc<dyn SessionRecordSink>,
    pub distance: DistanceConfig,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(distance: DistanceConfig) -> Self {
        let ledger = Arc::new(InMemoryStore::new());

        Self {
            gps_store: ledger.clone(),
            session_sink: ledger.clone(),
            ledger: Some(ledger),
            distance,
            metrics: Metrics::new(),
        }
    }

    /// Wires external collaborators in place of the in-memory ledger.
    pub fn with_collaborators(
        distance: DistanceConfig,
        gps_store: Arc<dyn GpsSampleStore>,
        session_sink: Arc<dyn SessionRecordSink>,
    ) -> Self {
        Self {
            ledger: None,
            gps_store,
            session_sink,
            distance,
            metrics: Metrics::new(),
        }
    }
}
