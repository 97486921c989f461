//! Common test utilities and fixtures
//!
//! - rstest for fixtures
//! - wiremock for HTTP mocking (isolated, parallel-safe)
//! - #[tokio::test] for async testing

#![allow(dead_code)]

pub mod fixtures;
pub mod responses;

pub use fixtures::{client_for, fast_tracker, mock_server, TEST_AUTH_TOKEN};
pub use responses::{
    // Submission
    submit_ack,
    // Polling
    batch_status,
    job_detail,
    // Archive
    active_prompts,
    result_listing,
    stored_result,
    // Errors
    error_detail,
    error_validation,
};
