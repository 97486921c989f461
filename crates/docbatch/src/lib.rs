//! # docbatch
//!
//! Client for a batch documentation-generation service:
//! - submit source content and get a batch of independently running jobs
//! - poll the batch in the background until it is terminal
//! - fetch per-job results and export them as Markdown artifacts
//! - recover the most recent batch from the results archive
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use docbatch::{BatchEvent, Client, DirectorySink, Session, TrackerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("http://localhost:8000")?;
//!     let session = Session::new(
//!         Arc::new(client),
//!         Arc::new(DirectorySink::new("results")),
//!         TrackerConfig::default(),
//!     );
//!
//!     let mut events = session.subscribe();
//!     session.submit("pub fn add(a: i32, b: i32) -> i32 { a + b }", "chatgpt", "gpt-4o-mini").await?;
//!
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             BatchEvent::Updated { batch } => println!("{}", docbatch::progress(&batch)),
//!             BatchEvent::Terminal { .. } => break,
//!             _ => {}
//!         }
//!     }
//!
//!     for artifact in session.download_all().await? {
//!         println!("saved {}", artifact.file_name);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
pub use archive::{ExportSummary, ResultsArchive};
pub use client::{Client, ClientBuilder};
pub use config::{ClientConfig, TrackerConfig};
pub use error::{Error, Result};
pub use service::BatchService;
pub use tracker::{
    ArtifactSink, BatchEvent, DirectorySink, DownloadCoordinator, FailureKind, JobDetailFetcher,
    MemorySink, PollingScheduler, Progress, ReportedFailure, SchedulerState, Session,
    SubmissionController, display_status, progress,
};
pub use types::*;

// Module declarations
pub mod archive;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod resources;
pub mod service;
pub mod tracker;
pub mod types;

// Re-export key dependencies for convenience
pub use async_trait::async_trait;

/// Prelude module for common imports
///
/// # Examples
///
/// ```rust
/// use docbatch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BatchService, Client, ClientConfig, Error, Result, Session, TrackerConfig,
        tracker::{ArtifactSink, BatchEvent, DirectorySink, MemorySink},
        types::{AiProvider, Artifact, Batch, BatchStatus, JobRef, JobStatus, ModelSelection},
    };
}

/// Crate version, automatically updated from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default service base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
