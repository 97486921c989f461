//! Pure projections of the tracked state for display

use serde::Serialize;
use std::fmt;

use crate::types::{Batch, JobStatus};

/// Completion of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    /// Finished jobs
    pub completed: u32,
    /// All jobs
    pub total: u32,
    /// `completed / total * 100`, or 0 for an empty batch
    pub percentage: f64,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.completed, self.total)
    }
}

/// Progress of `batch`.
pub fn progress(batch: &Batch) -> Progress {
    let completed = batch.completed_jobs;
    let total = batch.total_jobs;
    let percentage = if total > 0 {
        f64::from(completed) / f64::from(total) * 100.0
    } else {
        0.0
    };
    Progress {
        completed,
        total,
        percentage,
    }
}

/// Label shown for a job status.
pub fn display_status(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Queued => "queued/waiting",
        JobStatus::Started => "in progress",
        JobStatus::Finished => "done",
        JobStatus::Failed => "error",
    }
}
