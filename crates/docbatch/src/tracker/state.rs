//! Tracked batch state and snapshot application

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::types::{Batch, BatchSnapshot, JobDetail, JobStatus};

/// Lock a mutex, recovering the data if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What a snapshot changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotApplied {
    /// Jobs that moved to `finished` with this snapshot, in batch order
    pub newly_finished: Vec<String>,
    /// Jobs that moved to `failed` with this snapshot, in batch order
    pub newly_failed: Vec<String>,
    /// The batch is now `completed` or `failed`
    pub terminal: bool,
}

impl Batch {
    /// Fold a poll snapshot into the tracked batch.
    ///
    /// - a terminal batch is left untouched
    /// - terminal jobs keep their status, unknown job ids are ignored
    /// - `error_message` is kept only for failed jobs
    /// - `completed_jobs` is clamped to `total_jobs` and never decreases
    pub fn apply_snapshot(&mut self, snapshot: &BatchSnapshot) -> SnapshotApplied {
        let mut applied = SnapshotApplied::default();
        if self.is_terminal() {
            applied.terminal = true;
            return applied;
        }

        for incoming in &snapshot.jobs {
            let Some(job) = self.job_mut(&incoming.job_id) else {
                continue;
            };
            if job.status.is_terminal() {
                continue;
            }

            job.status = incoming.status;
            job.error_message = match incoming.status {
                JobStatus::Failed => incoming.error_message.clone(),
                _ => None,
            };

            match incoming.status {
                JobStatus::Finished => applied.newly_finished.push(job.job_id.clone()),
                JobStatus::Failed => applied.newly_failed.push(job.job_id.clone()),
                _ => {}
            }
        }

        let reported = snapshot.completed_jobs.min(self.total_jobs);
        self.completed_jobs = self.completed_jobs.max(reported);
        self.status = snapshot.status;
        applied.terminal = self.status.is_terminal();
        applied
    }

    /// Store a fetched detail on one of the batch's jobs. Returns `false` if
    /// the job is not part of this batch.
    pub(crate) fn attach_detail(&mut self, job_id: &str, detail: JobDetail) -> bool {
        match self.job_mut(job_id) {
            Some(job) => {
                job.detail = Some(detail);
                true
            }
            None => false,
        }
    }
}

/// The single batch a session tracks, shared between the session, the
/// poller and the detail fetcher.
#[derive(Debug, Clone, Default)]
pub(crate) struct BatchCell {
    inner: Arc<Mutex<Option<Batch>>>,
}

impl BatchCell {
    /// Copy of the tracked batch.
    pub(crate) fn get(&self) -> Option<Batch> {
        lock(&self.inner).clone()
    }

    /// Replace the tracked batch wholesale.
    pub(crate) fn replace(&self, batch: Batch) {
        *lock(&self.inner) = Some(batch);
    }

    /// Id of the tracked batch.
    pub(crate) fn current_id(&self) -> Option<String> {
        lock(&self.inner).as_ref().map(|batch| batch.batch_id.clone())
    }

    /// Run `f` on the tracked batch if it is still `batch_id`.
    pub(crate) fn update_if<R>(&self, batch_id: &str, f: impl FnOnce(&mut Batch) -> R) -> Option<R> {
        let mut guard = lock(&self.inner);
        match guard.as_mut() {
            Some(batch) if batch.batch_id == batch_id => Some(f(batch)),
            _ => None,
        }
    }
}
