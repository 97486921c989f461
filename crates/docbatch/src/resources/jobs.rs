//! Per-job result detail

use crate::client::Client;
use crate::error::{Error, Result};
use crate::types::JobDetail;

/// Job endpoints.
#[derive(Clone)]
pub struct Jobs {
    pub(super) client: Client,
}

impl Jobs {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Get the detail (tokens, result text) of one job.
    pub async fn get(&self, job_id: &str) -> Result<JobDetail> {
        if job_id.trim().is_empty() {
            return Err(Error::InvalidRequest("job_id must not be empty".to_string()));
        }
        self.client.apply_rate_limit().await;

        self.client
            .request(http::Method::GET, &format!("api/v1/ai_model/jobs/{}", job_id))?
            .send()
            .await?
            .parse_result()
    }
}
