//! Fetching job result detail

use std::sync::Arc;

use super::events::{BatchEvent, FailureKind, Reporter, ReportedFailure};
use super::state::BatchCell;
use crate::error::Result;
use crate::service::BatchService;
use crate::types::JobDetail;

/// Retrieves per-job detail and stores it on the tracked batch.
///
/// Every call re-fetches; a later fetch overwrites the stored detail.
#[derive(Debug, Clone)]
pub struct JobDetailFetcher {
    service: Arc<dyn BatchService>,
    batch: BatchCell,
    reporter: Reporter,
}

impl JobDetailFetcher {
    pub(crate) fn new(service: Arc<dyn BatchService>, batch: BatchCell, reporter: Reporter) -> Self {
        Self {
            service,
            batch,
            reporter,
        }
    }

    /// Fetch the detail of `job_id` and store it on the tracked batch.
    ///
    /// The detail is stored only if the batch tracked when the call started is
    /// still tracked when the response arrives. Failures are reported as
    /// [`FailureKind::DetailFetch`] and leave the job untouched.
    pub async fn fetch(&self, job_id: &str) -> Result<JobDetail> {
        let batch_id = self.batch.current_id();
        let detail = self.request(batch_id.as_deref(), job_id).await?;

        if let Some(batch_id) = batch_id {
            self.attach(&batch_id, job_id, detail.clone());
        }
        Ok(detail)
    }

    /// Fetch without storing, reporting failures.
    pub(crate) async fn request(&self, batch_id: Option<&str>, job_id: &str) -> Result<JobDetail> {
        match self.service.job_detail(job_id).await {
            Ok(detail) => Ok(detail),
            Err(error) => {
                let mut failure = ReportedFailure::new(FailureKind::DetailFetch, error.to_string()).job(job_id);
                if let Some(batch_id) = batch_id {
                    failure = failure.batch(batch_id);
                }
                self.reporter.report(failure);
                Err(error)
            }
        }
    }

    /// Store `detail` if `batch_id` is still the tracked batch.
    pub(crate) fn attach(&self, batch_id: &str, job_id: &str, detail: JobDetail) -> bool {
        let stored = self
            .batch
            .update_if(batch_id, |batch| batch.attach_detail(job_id, detail.clone()))
            .unwrap_or(false);

        if stored {
            tracing::debug!(batch_id = %batch_id, job_id = %job_id, tokens = detail.total_tokens, "Stored job detail");
            self.reporter.emit(BatchEvent::DetailFetched {
                job_id: job_id.to_string(),
                detail,
            });
        } else {
            tracing::debug!(batch_id = %batch_id, job_id = %job_id, "Discarded detail for untracked job");
        }
        stored
    }
}
