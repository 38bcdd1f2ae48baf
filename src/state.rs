use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::db::DatabaseProxy;
use crate::response::AppError;
use crate::review::SchedulePolicy;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    db_proxy: Option<Arc<DatabaseProxy>>,
    policy: Arc<SchedulePolicy>,
}

impl AppState {
    pub fn new(db_proxy: Option<Arc<DatabaseProxy>>, policy: SchedulePolicy) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            db_proxy,
            policy: Arc::new(policy),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn db_proxy(&self) -> Option<Arc<DatabaseProxy>> {
        self.db_proxy.clone()
    }

    /// The database handle, or a 503 when the server started without one.
    pub fn require_db(&self) -> Result<Arc<DatabaseProxy>, AppError> {
        self.db_proxy
            .clone()
            .ok_or_else(|| AppError::unavailable("database not initialized"))
    }

    pub fn policy(&self) -> Arc<SchedulePolicy> {
        Arc::clone(&self.policy)
    }
}
