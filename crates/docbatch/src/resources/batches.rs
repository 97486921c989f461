//! Batch submission and status

use crate::client::Client;
use crate::error::{Error, Result};
use crate::types::{BatchSnapshot, SubmitRequest, SubmitResponse};

const SUBMIT_PATH: &str = "api/v1/ai_model/send_prompt/";

/// Batch endpoints.
#[derive(Clone)]
pub struct Batches {
    pub(super) client: Client,
}

impl Batches {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Submit content for generation, creating a batch.
    ///
    /// Sent exactly once: the submit call is never retried at the transport
    /// level, a retry would create a second batch.
    pub async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse> {
        self.client.apply_rate_limit().await;

        self.client
            .request(http::Method::POST, SUBMIT_PATH)?
            .max_retries(0)
            .json(request)?
            .send()
            .await?
            .parse_result()
    }

    /// Get the status of a batch and its jobs.
    ///
    /// Sent once without transport retries: the poller calls this on a fixed
    /// interval, and the next poll is the retry.
    pub async fn get(&self, batch_id: &str) -> Result<BatchSnapshot> {
        if batch_id.trim().is_empty() {
            return Err(Error::InvalidRequest("batch_id must not be empty".to_string()));
        }
        self.client.apply_rate_limit().await;

        self.client
            .request(http::Method::GET, &format!("api/v1/ai_model/batch/{}", batch_id))?
            .max_retries(0)
            .send()
            .await?
            .parse_result()
    }
}
