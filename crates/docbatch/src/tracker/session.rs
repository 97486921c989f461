//! The host-owned tracking session

use std::sync::Arc;
use tokio::sync::broadcast;

use super::details::JobDetailFetcher;
use super::download::{ArtifactSink, DownloadCoordinator};
use super::events::{BatchEvent, Reporter};
use super::progress::{Progress, progress};
use super::scheduler::{PollingScheduler, SchedulerState};
use super::state::BatchCell;
use super::submission::SubmissionController;
use crate::config::TrackerConfig;
use crate::error::{Error, Result};
use crate::service::BatchService;
use crate::types::{Artifact, Batch, JobDetail, ModelSelection};

/// Tracks at most one batch at a time: submit, poll until terminal, export.
///
/// Dropping the session cancels polling.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use docbatch::{Client, DirectorySink, Session, TrackerConfig};
///
/// # async fn example() -> docbatch::Result<()> {
/// let client = Client::new("http://localhost:8000")?;
/// let session = Session::new(
///     Arc::new(client),
///     Arc::new(DirectorySink::new("results")),
///     TrackerConfig::default(),
/// );
///
/// let mut events = session.subscribe();
/// session.submit("fn main() {}", "chatgpt", "gpt-4o-mini").await?;
/// while let Ok(event) = events.recv().await {
///     if let docbatch::BatchEvent::Terminal { .. } = event {
///         break;
///     }
/// }
/// session.download_all().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Session {
    batch: BatchCell,
    reporter: Reporter,
    submission: SubmissionController,
    scheduler: PollingScheduler,
    details: JobDetailFetcher,
    downloads: DownloadCoordinator,
}

impl Session {
    /// Session talking to `service` and exporting into `sink`.
    pub fn new(service: Arc<dyn BatchService>, sink: Arc<dyn ArtifactSink>, config: TrackerConfig) -> Self {
        let batch = BatchCell::default();
        let reporter = Reporter::new(config.event_capacity);
        let details = JobDetailFetcher::new(service.clone(), batch.clone(), reporter.clone());
        let scheduler = PollingScheduler::new(
            service.clone(),
            batch.clone(),
            reporter.clone(),
            details.clone(),
            config.poll_interval,
            config.fetch_details_on_finish,
        );
        let downloads = DownloadCoordinator::new(service.clone(), sink, reporter.clone(), config.download_pause);
        let submission = SubmissionController::new(service, reporter.clone());

        Self {
            batch,
            reporter,
            submission,
            scheduler,
            details,
            downloads,
        }
    }

    /// Submit `content` and start tracking the new batch.
    ///
    /// On success the previous batch (if any) is replaced and polling restarts
    /// for the new one. On failure nothing changes, including polling of the
    /// previous batch.
    pub async fn submit(&self, content: &str, ai_model: &str, model: &str) -> Result<Batch> {
        let batch = self.submission.submit(content, ai_model, model).await?;

        self.scheduler.stop();
        self.batch.replace(batch.clone());
        self.reporter.emit(BatchEvent::Submitted { batch: batch.clone() });
        self.scheduler.start(batch.batch_id.clone());
        Ok(batch)
    }

    /// [`submit`](Self::submit) with a catalogue selection.
    pub async fn submit_with(&self, content: &str, selection: &ModelSelection) -> Result<Batch> {
        self.submit(content, selection.provider.as_str(), &selection.model).await
    }

    /// Stop polling. The tracked batch stays as it is.
    pub fn stop(&self) {
        self.scheduler.stop();
    }

    /// Copy of the tracked batch.
    pub fn batch(&self) -> Option<Batch> {
        self.batch.get()
    }

    /// Progress of the tracked batch.
    pub fn progress(&self) -> Option<Progress> {
        self.batch.get().as_ref().map(progress)
    }

    /// Polling lifecycle state.
    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Whether the most recent poll failed.
    pub fn last_poll_failed(&self) -> bool {
        self.scheduler.last_poll_failed()
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<BatchEvent> {
        self.reporter.subscribe()
    }

    /// Fetch (or re-fetch) one job's detail and store it.
    pub async fn fetch_detail(&self, job_id: &str) -> Result<JobDetail> {
        self.details.fetch(job_id).await
    }

    /// Export one job.
    pub async fn download_one(&self, job_id: &str) -> Result<Artifact> {
        self.downloads.download_one(job_id).await
    }

    /// Export every finished job of the tracked batch.
    pub async fn download_all(&self) -> Result<Vec<Artifact>> {
        let batch_id = self
            .batch
            .current_id()
            .ok_or_else(|| Error::InvalidRequest("no batch is being tracked".to_string()))?;
        self.downloads.download_all(&batch_id).await
    }
}
