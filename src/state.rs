use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{Config, REQUEST_TIMEOUT_MARGIN_SECS};
use crate::mail::Mailer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub mailer: Arc<Mailer>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, mailer: Mailer) -> Self {
        Self {
            config: Arc::new(config),
            mailer: Arc::new(mailer),
            started_at: Instant::now(),
        }
    }

    /// Whole-request timeout, never shorter than a fully exhausted transport chain.
    pub fn request_timeout(&self) -> Duration {
        let configured = Duration::from_secs(self.config.effective_request_timeout_secs());
        let floor =
            self.mailer.worst_case_delivery() + Duration::from_secs(REQUEST_TIMEOUT_MARGIN_SECS);
        configured.max(floor)
    }
}
