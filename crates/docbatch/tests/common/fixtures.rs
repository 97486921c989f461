//! Test fixtures using rstest

use docbatch::{Client, TrackerConfig};
use rstest::*;
use std::time::Duration;
use wiremock::MockServer;

/// Bearer token used by every test client.
pub const TEST_AUTH_TOKEN: &str = "test-token-12345";

/// Fixture providing a wiremock HTTP server
#[fixture]
pub async fn mock_server() -> MockServer {
    MockServer::start().await
}

/// Client pointed at `server`, retries disabled for predictability.
pub fn client_for(server: &MockServer) -> Client {
    Client::builder()
        .auth_token(TEST_AUTH_TOKEN)
        .base_url(server.uri())
        .timeout(Duration::from_secs(5))
        .max_retries(0)
        .build()
        .expect("Failed to build test client")
}

/// Tracker timings short enough for real-time tests.
#[fixture]
pub fn fast_tracker() -> TrackerConfig {
    TrackerConfig::default()
        .poll_interval(Duration::from_millis(250))
        .download_pause(Duration::from_millis(10))
}
