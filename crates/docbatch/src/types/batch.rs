//! Batch and job lifecycle types

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::JobDetail;

/// Status of a whole batch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    /// Accepted, no job has started yet
    Queued,
    /// At least one job is running or done
    #[serde(alias = "started", alias = "running")]
    Processing,
    /// Every job reached a terminal status
    Completed,
    /// The batch as a whole failed
    Failed,
}

impl BatchStatus {
    /// Whether no further status change is expected.
    pub fn is_terminal(self) -> bool {
        matches!(self, BatchStatus::Completed | BatchStatus::Failed)
    }

    /// Get the string representation of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            BatchStatus::Queued => "queued",
            BatchStatus::Processing => "processing",
            BatchStatus::Completed => "completed",
            BatchStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single job.
///
/// The worker queue reports a few extra states; `deferred` and `scheduled`
/// read as queued, `canceled` and `stopped` as failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Waiting for a worker
    #[serde(alias = "deferred", alias = "scheduled")]
    Queued,
    /// Running
    Started,
    /// Result available
    Finished,
    /// Gave up
    #[serde(alias = "canceled", alias = "stopped")]
    Failed,
}

impl JobStatus {
    /// Whether the job can no longer change status.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Failed)
    }

    /// Get the string representation of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Started => "started",
            JobStatus::Finished => "finished",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submitted batch as tracked on the client.
///
/// `batch_id`, `total_jobs` and the job list are fixed at creation; polling
/// only mutates statuses and counters in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Batch {
    /// Identifier assigned by the service
    pub batch_id: String,
    /// Number of jobs in the batch
    pub total_jobs: u32,
    /// Jobs finished so far, never decreasing and never above `total_jobs`
    pub completed_jobs: u32,
    /// Batch-level status
    pub status: BatchStatus,
    /// Jobs in submission order
    pub jobs: Vec<JobRef>,
}

impl Batch {
    /// Build the initial queued batch from a submit acknowledgement.
    pub fn from_submission(response: SubmitResponse) -> Self {
        let jobs: Vec<JobRef> = response
            .jobs
            .into_iter()
            .map(|job| JobRef::queued(job.job_id, job.prompt_name))
            .collect();

        let listed = u32::try_from(jobs.len()).unwrap_or(u32::MAX);
        if listed != response.total {
            tracing::debug!(
                batch_id = %response.batch_id,
                reported = response.total,
                listed,
                "Submit response total disagrees with job list, using job list"
            );
        }

        Self {
            batch_id: response.batch_id,
            total_jobs: listed,
            completed_jobs: 0,
            status: BatchStatus::Queued,
            jobs,
        }
    }

    /// Whether the batch reached `completed` or `failed`.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Look up a job by id.
    pub fn job(&self, job_id: &str) -> Option<&JobRef> {
        self.jobs.iter().find(|job| job.job_id == job_id)
    }

    pub(crate) fn job_mut(&mut self, job_id: &str) -> Option<&mut JobRef> {
        self.jobs.iter_mut().find(|job| job.job_id == job_id)
    }

    /// Finished jobs, in submission order.
    pub fn finished_jobs(&self) -> impl Iterator<Item = &JobRef> {
        self.jobs.iter().filter(|job| job.status == JobStatus::Finished)
    }
}

/// A job inside a tracked batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRef {
    /// Identifier assigned by the service
    pub job_id: String,
    /// Name of the prompt that produced this job
    pub prompt_name: String,
    /// Current status
    pub status: JobStatus,
    /// Failure reason; only ever set while `status` is `failed`
    pub error_message: Option<String>,
    /// Result detail, once fetched
    pub detail: Option<JobDetail>,
}

impl JobRef {
    /// A freshly submitted job.
    pub fn queued(job_id: impl Into<String>, prompt_name: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            prompt_name: prompt_name.into(),
            status: JobStatus::Queued,
            error_message: None,
            detail: None,
        }
    }
}

/// Body of the submit call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Builder)]
#[builder(setter(into))]
pub struct SubmitRequest {
    /// Provider key, e.g. `chatgpt`
    pub ai_model: String,
    /// Model name within the provider
    pub model: String,
    /// Raw source content to document
    pub request: String,
}

impl SubmitRequest {
    /// Create a builder for constructing a SubmitRequest.
    pub fn builder() -> SubmitRequestBuilder {
        SubmitRequestBuilder::default()
    }
}

/// Acknowledgement of a submit call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmitResponse {
    /// Identifier of the created batch
    pub batch_id: String,
    /// Number of jobs the service created
    #[serde(default)]
    pub total: u32,
    /// Created jobs in submission order
    #[serde(default)]
    pub jobs: Vec<SubmittedJob>,
}

/// One job listed in a submit acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmittedJob {
    /// Job identifier
    pub job_id: String,
    /// Prompt name
    pub prompt_name: String,
}

/// Batch status as returned by one poll.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchSnapshot {
    /// Echo of the batch id, when the service includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    /// Batch status
    pub status: BatchStatus,
    /// Finished job count
    #[serde(default)]
    pub completed_jobs: u32,
    /// Total job count
    #[serde(default)]
    pub total_jobs: u32,
    /// Per-job statuses
    #[serde(default)]
    pub jobs: Vec<JobSnapshot>,
}

impl BatchSnapshot {
    /// Finished jobs of this snapshot, in the order listed.
    pub fn finished_jobs(&self) -> impl Iterator<Item = &JobSnapshot> {
        self.jobs.iter().filter(|job| job.status == JobStatus::Finished)
    }
}

/// Per-job status inside a [`BatchSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobSnapshot {
    /// Job identifier
    pub job_id: String,
    /// Job status
    pub status: JobStatus,
    /// Failure reason, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Prompt name, when the service includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_name: Option<String>,
}
