//! Exporting finished jobs as artifacts

use async_trait::async_trait;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::events::{BatchEvent, FailureKind, Reporter, ReportedFailure};
use super::state::lock;
use crate::error::{Error, Result};
use crate::service::BatchService;
use crate::types::Artifact;

/// Destination for exported artifacts.
#[async_trait]
pub trait ArtifactSink: Send + Sync + fmt::Debug {
    /// Persist or hand over one artifact.
    async fn save(&self, artifact: &Artifact) -> Result<()>;
}

/// Writes artifacts as files into a directory, created on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Sink writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn target(&self, file_name: &str) -> Result<PathBuf> {
        let mut components = Path::new(file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.dir.join(file_name)),
            _ => Err(Error::InvalidRequest(format!(
                "artifact name '{}' is not a plain file name",
                file_name
            ))),
        }
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn save(&self, artifact: &Artifact) -> Result<()> {
        let path = self.target(&artifact.file_name)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, artifact.content.as_bytes()).await?;
        tracing::debug!(path = %path.display(), bytes = artifact.content.len(), "Wrote artifact");
        Ok(())
    }
}

/// Keeps artifacts in memory, in the order they were saved.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Mutex<Vec<Artifact>>,
}

impl MemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything saved so far.
    pub fn artifacts(&self) -> Vec<Artifact> {
        lock(&self.artifacts).clone()
    }
}

#[async_trait]
impl ArtifactSink for MemorySink {
    async fn save(&self, artifact: &Artifact) -> Result<()> {
        lock(&self.artifacts).push(artifact.clone());
        Ok(())
    }
}

/// Turns finished jobs into artifacts, one at a time.
///
/// Reads fresh state from the service and never touches the tracked batch.
#[derive(Debug, Clone)]
pub struct DownloadCoordinator {
    service: Arc<dyn BatchService>,
    sink: Arc<dyn ArtifactSink>,
    reporter: Reporter,
    pause: Duration,
}

impl DownloadCoordinator {
    /// Coordinator pausing `pause` between consecutive downloads.
    pub fn new(
        service: Arc<dyn BatchService>,
        sink: Arc<dyn ArtifactSink>,
        reporter: Reporter,
        pause: Duration,
    ) -> Self {
        Self {
            service,
            sink,
            reporter,
            pause,
        }
    }

    /// Export one job: fetch its detail and hand `<prompt_name>.md` to the sink.
    ///
    /// Fails with [`Error::Download`]; other downloads are unaffected.
    pub async fn download_one(&self, job_id: &str) -> Result<Artifact> {
        self.export(job_id).await.inspect_err(|error| {
            self.reporter
                .report(ReportedFailure::new(FailureKind::Download, error.to_string()).job(job_id));
        })
    }

    /// Export every finished job of `batch_id`, in submission order.
    ///
    /// Downloads run strictly one after another with the configured pause in
    /// between. The first failure aborts the rest with
    /// [`Error::DownloadAllAborted`]; artifacts already saved stay saved.
    pub async fn download_all(&self, batch_id: &str) -> Result<Vec<Artifact>> {
        let snapshot = match self.service.batch_status(batch_id).await {
            Ok(snapshot) => snapshot,
            Err(source) => return Err(self.abort(batch_id, None, 0, source)),
        };

        let finished: Vec<String> = snapshot.finished_jobs().map(|job| job.job_id.clone()).collect();
        tracing::info!(batch_id = %batch_id, jobs = finished.len(), "Downloading finished jobs");

        let mut artifacts = Vec::with_capacity(finished.len());
        for (index, job_id) in finished.iter().enumerate() {
            if index > 0 && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
            match self.export(job_id).await {
                Ok(artifact) => artifacts.push(artifact),
                Err(source) => {
                    return Err(self.abort(batch_id, Some(job_id.clone()), artifacts.len(), source));
                }
            }
        }
        Ok(artifacts)
    }

    async fn export(&self, job_id: &str) -> Result<Artifact> {
        let wrap = |source: Error| Error::Download {
            job_id: job_id.to_string(),
            source: Box::new(source),
        };

        let detail = self.service.job_detail(job_id).await.map_err(wrap)?;
        let artifact = if detail.prompt_name.is_empty() {
            Artifact::markdown(job_id, detail.result_text)
        } else {
            Artifact::from_detail(&detail)
        };
        self.sink.save(&artifact).await.map_err(wrap)?;

        tracing::debug!(job_id = %job_id, file_name = %artifact.file_name, "Exported artifact");
        self.reporter.emit(BatchEvent::Downloaded {
            job_id: job_id.to_string(),
            artifact: artifact.clone(),
        });
        Ok(artifact)
    }

    fn abort(&self, batch_id: &str, job_id: Option<String>, completed: usize, source: Error) -> Error {
        let mut failure =
            ReportedFailure::new(FailureKind::DownloadAllAbort, source.to_string()).batch(batch_id);
        if let Some(job_id) = &job_id {
            failure = failure.job(job_id.clone());
        }
        self.reporter.report(failure);

        Error::DownloadAllAborted {
            job_id,
            completed,
            source: Box::new(source),
        }
    }
}
