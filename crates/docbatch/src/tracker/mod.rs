//! Batch/job lifecycle tracking
//!
//! [`Session`] is the entry point. It wires a [`SubmissionController`], a
//! [`PollingScheduler`], a [`JobDetailFetcher`] and a [`DownloadCoordinator`]
//! around one shared tracked batch and one event channel.

pub mod details;
pub mod download;
pub mod events;
pub mod progress;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod submission;

#[cfg(test)]
pub(crate) mod testing;

pub use details::JobDetailFetcher;
pub use download::{ArtifactSink, DirectorySink, DownloadCoordinator, MemorySink};
pub use events::{BatchEvent, FailureKind, Reporter, ReportedFailure};
pub use progress::{Progress, display_status, progress};
pub use scheduler::{PollingScheduler, SchedulerState};
pub use session::Session;
pub use state::SnapshotApplied;
pub use submission::SubmissionController;
