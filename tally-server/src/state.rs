use std::{fmt, sync::Arc};

use tally_core::RequestTracker;

use crate::config::Config;

/// Shared handles every handler can reach through the `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<RequestTracker>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(tracker: Arc<RequestTracker>, config: Arc<Config>) -> Self {
        Self { tracker, config }
    }
}
