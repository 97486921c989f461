//! Exported artifacts

use serde::Serialize;

use super::JobDetail;

/// MIME type of every exported artifact.
pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown";

/// A generated document ready to be written somewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// File name, `<prompt_name>.md`
    pub file_name: String,
    /// Always [`MARKDOWN_CONTENT_TYPE`]
    pub content_type: &'static str,
    /// Result text, verbatim
    pub content: String,
}

impl Artifact {
    /// Artifact for a job detail. The prompt name is used as-is.
    pub fn from_detail(detail: &JobDetail) -> Self {
        Self::markdown(&detail.prompt_name, detail.result_text.clone())
    }

    /// Markdown artifact named `<stem>.md`.
    pub fn markdown(stem: &str, content: String) -> Self {
        Self {
            file_name: format!("{}.md", stem),
            content_type: MARKDOWN_CONTENT_TYPE,
            content,
        }
    }
}
