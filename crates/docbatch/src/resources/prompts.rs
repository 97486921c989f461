//! Prompt catalogue

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Result;

/// A prompt configured on the service.
///
/// Only the fields the client reads are modelled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptSummary {
    /// Prompt name
    #[serde(default)]
    pub prompt_name: Option<String>,
    /// Whether the prompt runs for new submissions
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Prompt endpoints.
#[derive(Clone)]
pub struct Prompts {
    pub(super) client: Client,
}

impl Prompts {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// List the prompts that are currently active.
    pub async fn list_active(&self) -> Result<Vec<PromptSummary>> {
        self.client.apply_rate_limit().await;

        self.client
            .request(http::Method::GET, "api/v1/prompts/")?
            .query("is_active", "true")
            .send()
            .await?
            .parse_result()
    }

    /// Number of active prompts, which is also the number of jobs a submission creates.
    pub async fn active_count(&self) -> Result<usize> {
        Ok(self.list_active().await?.len())
    }
}
