//! In-memory batch service for tracker tests

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use super::state::lock;
use crate::error::{Error, Result};
use crate::service::BatchService;
use crate::types::{
    BatchSnapshot, BatchStatus, JobDetail, JobSnapshot, JobStatus, SubmitRequest, SubmitResponse,
    SubmittedJob,
};

/// Failure the fake hands back.
#[derive(Debug, Clone)]
pub(crate) enum FakeFailure {
    /// Transport-level failure
    Connection(String),
    /// HTTP error status with a `detail` message
    Status(u16, String),
}

impl FakeFailure {
    fn into_error(self) -> Error {
        match self {
            FakeFailure::Connection(message) => Error::Connection(message),
            FakeFailure::Status(status, detail) => Error::from_response(
                status,
                &serde_json::json!({ "detail": detail }).to_string(),
                &http::HeaderMap::new(),
            ),
        }
    }
}

type Reply<T> = std::result::Result<T, FakeFailure>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallKind {
    Submit,
    BatchStatus,
    JobDetail,
}

#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub kind: CallKind,
    pub id: String,
    pub at: Instant,
}

/// Scripted [`BatchService`].
///
/// Batch snapshots are served in order per batch id; the last one keeps
/// being served once the script runs out.
#[derive(Debug, Default)]
pub(crate) struct FakeService {
    submits: Mutex<VecDeque<Reply<SubmitResponse>>>,
    snapshots: Mutex<HashMap<String, VecDeque<Reply<BatchSnapshot>>>>,
    details: Mutex<HashMap<String, Reply<JobDetail>>>,
    status_delay: Mutex<Duration>,
    detail_delay: Mutex<Duration>,
    calls: Mutex<Vec<Call>>,
}

impl FakeService {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_submit(&self, reply: Reply<SubmitResponse>) {
        lock(&self.submits).push_back(reply);
    }

    pub(crate) fn push_snapshot(&self, batch_id: &str, reply: Reply<BatchSnapshot>) {
        lock(&self.snapshots)
            .entry(batch_id.to_string())
            .or_default()
            .push_back(reply);
    }

    pub(crate) fn set_detail(&self, job_id: &str, reply: Reply<JobDetail>) {
        lock(&self.details).insert(job_id.to_string(), reply);
    }

    /// Delay every batch status reply by `delay`.
    pub(crate) fn delay_status(&self, delay: Duration) {
        *lock(&self.status_delay) = delay;
    }

    /// Delay every job detail reply by `delay`.
    pub(crate) fn delay_detail(&self, delay: Duration) {
        *lock(&self.detail_delay) = delay;
    }

    pub(crate) fn calls(&self, kind: CallKind) -> Vec<Call> {
        lock(&self.calls)
            .iter()
            .filter(|call| call.kind == kind)
            .cloned()
            .collect()
    }

    pub(crate) fn count(&self, kind: CallKind) -> usize {
        self.calls(kind).len()
    }

    fn record(&self, kind: CallKind, id: &str) {
        lock(&self.calls).push(Call {
            kind,
            id: id.to_string(),
            at: Instant::now(),
        });
    }
}

#[async_trait]
impl BatchService for FakeService {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse> {
        self.record(CallKind::Submit, &request.ai_model);
        let reply = lock(&self.submits).pop_front();
        match reply {
            Some(reply) => reply.map_err(FakeFailure::into_error),
            None => Err(Error::Connection("no scripted submit reply".to_string())),
        }
    }

    async fn batch_status(&self, batch_id: &str) -> Result<BatchSnapshot> {
        self.record(CallKind::BatchStatus, batch_id);
        let delay = *lock(&self.status_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let reply = {
            let mut snapshots = lock(&self.snapshots);
            match snapshots.get_mut(batch_id) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        match reply {
            Some(reply) => reply.map_err(FakeFailure::into_error),
            None => Err(Error::NotFound(format!("batch {}", batch_id))),
        }
    }

    async fn job_detail(&self, job_id: &str) -> Result<JobDetail> {
        self.record(CallKind::JobDetail, job_id);
        let delay = *lock(&self.detail_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let reply = lock(&self.details).get(job_id).cloned();
        match reply {
            Some(reply) => reply.map_err(FakeFailure::into_error),
            None => Err(Error::NotFound(format!("job {}", job_id))),
        }
    }
}

pub(crate) fn submit_response(batch_id: &str, jobs: &[(&str, &str)]) -> SubmitResponse {
    SubmitResponse {
        batch_id: batch_id.to_string(),
        total: jobs.len() as u32,
        jobs: jobs
            .iter()
            .map(|(job_id, prompt_name)| SubmittedJob {
                job_id: job_id.to_string(),
                prompt_name: prompt_name.to_string(),
            })
            .collect(),
    }
}

pub(crate) fn snapshot(status: BatchStatus, completed: u32, jobs: &[(&str, JobStatus)]) -> BatchSnapshot {
    BatchSnapshot {
        batch_id: None,
        status,
        completed_jobs: completed,
        total_jobs: jobs.len() as u32,
        jobs: jobs
            .iter()
            .map(|(job_id, status)| JobSnapshot {
                job_id: job_id.to_string(),
                status: *status,
                error_message: None,
                prompt_name: None,
            })
            .collect(),
    }
}

pub(crate) fn detail(prompt_name: &str, result_text: &str) -> JobDetail {
    JobDetail {
        status: Some(JobStatus::Finished),
        total_tokens: 100,
        result_text: result_text.to_string(),
        prompt_name: prompt_name.to_string(),
    }
}

/// Let spawned tasks run without moving the paused clock noticeably.
pub(crate) async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
