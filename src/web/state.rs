//! Shared state for shell server handlers

use std::sync::Arc;
use std::time::Instant;

use crate::app::App;

#[derive(Clone)]
pub struct WebState {
    pub app: Arc<App>,
    pub start_time: Instant,
}

impl WebState {
    pub fn new(app: Arc<App>) -> Self {
        Self {
            app,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
