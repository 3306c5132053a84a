//! Background job tracking.
//!
//! `submit` records a job as `Queued` and hands execution to a detached
//! task; callers follow progress by polling `status`. There is no push
//! notification and no cancellation.
//!
//! ```text
//!   submit ──► Queued ──spawn──► Running ──► Completed | Failed
//!                 ▲                                  │
//!                 └────────── status (poll) ─────────┘
//! ```

mod state;
mod tracker;

pub use state::{Job, JobStatus};
pub use tracker::{JobError, JobRunner, JobTracker, RunnerError, WaitRunner};
