//! Notifications and failure reporting
//!
//! Everything the tracker wants the host to know goes through one
//! broadcast channel. Failures are also logged at `warn`.

use serde::Serialize;
use std::fmt;
use tokio::sync::broadcast;

use crate::observability;
use crate::types::{Artifact, Batch, JobDetail};

/// Where a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The submit call failed; nothing was created
    Submission,
    /// One poll failed; polling continues
    PollingTransport,
    /// Fetching a job's detail failed; the job keeps its status
    DetailFetch,
    /// One download failed
    Download,
    /// A download-all sequence stopped early
    DownloadAllAbort,
}

impl FailureKind {
    /// Whether the failure ends the operation it happened in.
    ///
    /// Poll and detail failures are absorbed; the rest abort what the
    /// caller asked for.
    pub fn is_fatal(self) -> bool {
        !matches!(self, FailureKind::PollingTransport | FailureKind::DetailFetch)
    }

    /// Get the string representation of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Submission => "submission",
            FailureKind::PollingTransport => "polling_transport",
            FailureKind::DetailFetch => "detail_fetch",
            FailureKind::Download => "download",
            FailureKind::DownloadAllAbort => "download_all_abort",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure surfaced to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedFailure {
    /// Classification
    pub kind: FailureKind,
    /// Human-readable message
    pub message: String,
    /// Batch involved, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    /// Job involved, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

impl ReportedFailure {
    /// Failure with just a kind and a message.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            batch_id: None,
            job_id: None,
        }
    }

    /// Attach the batch id.
    pub fn batch(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    /// Attach the job id.
    pub fn job(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    /// Whether the failure ended the operation it happened in.
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}

/// Event emitted by a tracking session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchEvent {
    /// A new batch replaced whatever was tracked before
    Submitted {
        /// The fresh batch
        batch: Batch,
    },
    /// A poll was applied
    Updated {
        /// Batch after the poll
        batch: Batch,
    },
    /// The batch reached `completed` or `failed`; polling stopped
    Terminal {
        /// Final batch
        batch: Batch,
    },
    /// A job's detail was fetched and stored
    DetailFetched {
        /// Job id
        job_id: String,
        /// Fetched detail
        detail: JobDetail,
    },
    /// An artifact was handed to the sink
    Downloaded {
        /// Job id
        job_id: String,
        /// Exported artifact
        artifact: Artifact,
    },
    /// Something went wrong
    Failure {
        /// What failed
        failure: ReportedFailure,
    },
}

/// Broadcasts [`BatchEvent`]s to every subscriber.
#[derive(Debug, Clone)]
pub struct Reporter {
    event_tx: broadcast::Sender<BatchEvent>,
}

impl Reporter {
    /// Reporter with room for `capacity` unread events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (event_tx, _rx) = broadcast::channel(capacity.max(1));
        Self { event_tx }
    }

    /// Subscribe to events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<BatchEvent> {
        self.event_tx.subscribe()
    }

    /// Emit an event. Dropped silently when nobody listens.
    pub fn emit(&self, event: BatchEvent) {
        self.event_tx.send(event).ok();
    }

    /// Log and broadcast a failure.
    pub fn report(&self, failure: ReportedFailure) {
        observability::log_failure(failure.kind.as_str(), failure.is_fatal(), &failure.message);
        self.emit(BatchEvent::Failure { failure });
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(crate::config::TrackerConfig::default().event_capacity)
    }
}
