//! Submitting content and creating the tracked batch

use std::sync::Arc;

use super::events::{FailureKind, Reporter, ReportedFailure};
use crate::error::{Error, Result};
use crate::service::BatchService;
use crate::types::{Batch, SubmitRequest};

/// Sends the generation request and builds the first [`Batch`].
#[derive(Debug, Clone)]
pub struct SubmissionController {
    service: Arc<dyn BatchService>,
    reporter: Reporter,
}

impl SubmissionController {
    /// Controller reporting failures through `reporter`.
    pub fn new(service: Arc<dyn BatchService>, reporter: Reporter) -> Self {
        Self { service, reporter }
    }

    /// Submit `content` to `model` of provider `ai_model`.
    ///
    /// Exactly one request is made. On success the returned batch is queued
    /// with every job queued; on failure nothing is created and the error is
    /// [`Error::Submission`]. Empty content is rejected before any request.
    pub async fn submit(&self, content: &str, ai_model: &str, model: &str) -> Result<Batch> {
        if content.trim().is_empty() {
            return Err(Error::InvalidRequest("content must not be empty".to_string()));
        }

        let request = SubmitRequest {
            ai_model: ai_model.to_string(),
            model: model.to_string(),
            request: content.to_string(),
        };

        match self.service.submit(&request).await {
            Ok(response) => {
                let batch = Batch::from_submission(response);
                tracing::info!(
                    batch_id = %batch.batch_id,
                    jobs = batch.total_jobs,
                    ai_model = %request.ai_model,
                    model = %request.model,
                    "Batch submitted"
                );
                Ok(batch)
            }
            Err(source) => {
                let error = Error::submission(source);
                if let Error::Submission { message, .. } = &error {
                    self.reporter
                        .report(ReportedFailure::new(FailureKind::Submission, message.clone()));
                }
                Err(error)
            }
        }
    }
}
