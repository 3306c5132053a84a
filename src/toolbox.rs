//! Owner of every component's state for the life of the process.

use std::sync::Arc;

use crate::config::Config;
use crate::guard::AccessGuard;
use crate::jobs::JobTracker;
use crate::ledger::LifecycleLedger;
use crate::tools::memo::{ExpiringMemo, TextSummary};
use crate::tools::rate_limiter::WindowLimiter;

/// The five independent state owners. Components never reference one
/// another; tools each hold an `Arc` to the one they front.
#[derive(Clone)]
pub struct Toolbox {
    pub memo: Arc<ExpiringMemo<TextSummary>>,
    pub limiter: Arc<WindowLimiter>,
    pub jobs: Arc<JobTracker>,
    pub guard: Arc<AccessGuard>,
    pub ledger: Arc<LifecycleLedger>,
}

impl Toolbox {
    pub fn new(config: &Config) -> Self {
        Self {
            memo: Arc::new(ExpiringMemo::new(&config.memo)),
            limiter: Arc::new(WindowLimiter::new(config.limiter.clone())),
            jobs: Arc::new(JobTracker::new(config.jobs.clone())),
            guard: Arc::new(AccessGuard::new(&config.guard)),
            ledger: Arc::new(LifecycleLedger::new(&config.ledger)),
        }
    }
}
