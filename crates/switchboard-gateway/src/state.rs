//! Shared application state for the gateway

use std::time::Instant;

use switchboard_core::Orchestrator;

/// State handed to every route handler
pub struct AppState {
    pub orchestrator: Orchestrator,
    /// Server start time, for health checks
    pub start_time: Instant,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
