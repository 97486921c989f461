//! Stored job results

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Result;

/// Entry of the result listing, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultSummary {
    /// Result identifier
    pub id: u64,
    /// Batch the result belongs to, when listed
    #[serde(default)]
    pub batch_id: Option<String>,
}

/// A stored result with its generated text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredResult {
    /// Result identifier
    pub id: u64,
    /// Batch the result belongs to
    #[serde(default)]
    pub batch_id: Option<String>,
    /// Job status as stored by the worker
    #[serde(default)]
    pub status: Option<String>,
    /// Prompt that produced the result
    #[serde(default)]
    pub prompt_name: Option<String>,
    /// Generated document
    #[serde(default)]
    pub result_text: Option<String>,
    /// When the worker stored the result (service local time, no offset)
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
}

impl StoredResult {
    /// Whether the job behind this result finished successfully.
    pub fn is_finished(&self) -> bool {
        self.status.as_deref() == Some("finished")
    }
}

/// Result endpoints.
#[derive(Clone)]
pub struct Results {
    pub(super) client: Client,
}

impl Results {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// List the `limit` most recent results, newest first.
    pub async fn list(&self, limit: usize) -> Result<Vec<ResultSummary>> {
        self.client.apply_rate_limit().await;

        self.client
            .request(http::Method::GET, "api/v1/ai_model/results")?
            .query("limit", &limit.to_string())
            .send()
            .await?
            .parse_result()
    }

    /// Get one stored result.
    pub async fn get(&self, id: u64) -> Result<StoredResult> {
        self.client.apply_rate_limit().await;

        self.client
            .request(http::Method::GET, &format!("api/v1/ai_model/results/{}", id))?
            .send()
            .await?
            .parse_result()
    }
}
