//! Job result detail

use serde::{Deserialize, Serialize};

use super::JobStatus;

/// Result detail of one job, fetched once the job finished.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobDetail {
    /// Job status reported alongside the detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    /// Tokens consumed generating the result
    #[serde(default)]
    pub total_tokens: u64,
    /// Generated document
    #[serde(default)]
    pub result_text: String,
    /// Prompt name, used to name the exported file
    #[serde(default)]
    pub prompt_name: String,
}
