//! Abstraction over the remote batch service
//!
//! The tracker talks to the service only through [`BatchService`], so it can
//! run against the HTTP [`Client`](crate::Client) or an in-memory fake.

use async_trait::async_trait;
use std::fmt;

use crate::error::Result;
use crate::types::{BatchSnapshot, JobDetail, SubmitRequest, SubmitResponse};

/// Operations the tracker needs from the batch service.
#[async_trait]
pub trait BatchService: Send + Sync + fmt::Debug {
    /// Submit a generation request. Must not be retried by the implementation.
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse>;

    /// Current status of a batch and its jobs.
    async fn batch_status(&self, batch_id: &str) -> Result<BatchSnapshot>;

    /// Result detail of one job.
    async fn job_detail(&self, job_id: &str) -> Result<JobDetail>;
}

#[async_trait]
impl BatchService for crate::Client {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse> {
        self.batches().submit(request).await
    }

    async fn batch_status(&self, batch_id: &str) -> Result<BatchSnapshot> {
        self.batches().get(batch_id).await
    }

    async fn job_detail(&self, job_id: &str) -> Result<JobDetail> {
        self.jobs().get(job_id).await
    }
}
