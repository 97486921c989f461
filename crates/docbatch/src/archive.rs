//! Recovering the most recent batch from the service's result archive
//!
//! Useful outside a live [`Session`](crate::Session): the service keeps every
//! job result, so the latest batch can be exported after the fact.

use serde::Serialize;

use crate::client::Client;
use crate::error::Result;
use crate::resources::results::StoredResult;
use crate::tracker::ArtifactSink;
use crate::types::Artifact;

/// Outcome of [`ResultsArchive::export_latest_batch`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    /// Batch that was exported, `None` if there were no results
    pub batch_id: Option<String>,
    /// File names saved, in listing order
    pub saved: Vec<String>,
    /// Results of the batch that were not saved (unfinished or failing)
    pub skipped: usize,
}

/// Reads stored results and exports them through an [`ArtifactSink`].
#[derive(Debug, Clone)]
pub struct ResultsArchive {
    client: Client,
}

impl ResultsArchive {
    /// Archive reader over `client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Export every finished result of the newest batch into `sink`.
    ///
    /// The number of active prompts bounds how many recent results are
    /// listed, since one submission creates one job per active prompt. The
    /// newest listed result decides the batch. Results that cannot be fetched
    /// or saved are logged and counted as skipped.
    ///
    /// # Errors
    ///
    /// Fails only if the prompt count, the listing, or the newest result
    /// cannot be fetched.
    pub async fn export_latest_batch(&self, sink: &dyn ArtifactSink) -> Result<ExportSummary> {
        let limit = self.client.prompts().active_count().await?;
        let listed = self.client.results().list(limit).await?;
        tracing::info!(active_prompts = limit, listed = listed.len(), "Listed recent results");

        let Some(newest) = listed.first() else {
            return Ok(ExportSummary::default());
        };
        let Some(batch_id) = self.client.results().get(newest.id).await?.batch_id else {
            tracing::warn!(result_id = newest.id, "Newest result has no batch id");
            return Ok(ExportSummary::default());
        };

        let mut summary = ExportSummary {
            batch_id: Some(batch_id.clone()),
            ..ExportSummary::default()
        };

        for item in &listed {
            let result = match self.client.results().get(item.id).await {
                Ok(result) => result,
                Err(error) => {
                    tracing::warn!(result_id = item.id, error = %error, "Could not fetch result");
                    summary.skipped += 1;
                    continue;
                }
            };
            if result.batch_id.as_deref() != Some(batch_id.as_str()) {
                continue;
            }
            if !result.is_finished() {
                tracing::debug!(result_id = item.id, status = ?result.status, "Skipping unfinished result");
                summary.skipped += 1;
                continue;
            }

            let artifact = archived_artifact(&result);
            tracing::debug!(result_id = item.id, completed_at = ?result.completed_at, file_name = %artifact.file_name, "Exporting result");
            match sink.save(&artifact).await {
                Ok(()) => summary.saved.push(artifact.file_name),
                Err(error) => {
                    tracing::warn!(file_name = %artifact.file_name, error = %error, "Could not save result");
                    summary.skipped += 1;
                }
            }
        }

        tracing::info!(batch_id = %batch_id, saved = summary.saved.len(), skipped = summary.skipped, "Archive export finished");
        Ok(summary)
    }
}

fn archived_artifact(result: &StoredResult) -> Artifact {
    let stem = match result.prompt_name.as_deref() {
        Some(name) => safe_file_stem(name),
        None => format!("result_{}", result.id),
    };
    Artifact::markdown(&stem, result.result_text.clone().unwrap_or_default())
}

/// Replace everything but alphanumerics, `_` and `-` with `_`.
pub fn safe_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}
