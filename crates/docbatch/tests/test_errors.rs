//! Error mapping and retry behaviour
//!
//! - HTTP status to error variant mapping
//! - `detail` message and validation list parsing
//! - Retry of rate-limited reads, no retry of submissions

use assert_matches::assert_matches;
use docbatch::{Client, Error, SubmitRequest};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{client_for, error_detail, error_validation, job_detail};

fn submit_request() -> SubmitRequest {
    SubmitRequest::builder()
        .ai_model("chatgpt")
        .model("gpt-4o-mini")
        .request("fn main() {}")
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_not_found_carries_detail_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/ai_model/batch/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(error_detail("Batch not found")))
        .mount(&server)
        .await;

    let result = client_for(&server).batches().get("missing").await;

    assert_matches!(result, Err(Error::NotFound(message)) if message == "Batch not found");
}

#[tokio::test]
async fn test_validation_errors_are_flattened() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/ai_model/send_prompt/"))
        .respond_with(ResponseTemplate::new(422).set_body_json(error_validation("request", "Field required")))
        .mount(&server)
        .await;

    let result = client_for(&server).batches().submit(&submit_request()).await;

    match result {
        Err(Error::UnprocessableEntity { message, errors }) => {
            assert_eq!(message, "body.request: Field required");
            let errors = errors.expect("validation errors");
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "body.request");
        }
        other => panic!("Expected UnprocessableEntity, got {:?}", other),
    }
}

#[tokio::test]
async fn test_plain_text_error_body_used_as_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/ai_model/jobs/j1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("worker crashed"))
        .mount(&server)
        .await;

    let result = client_for(&server).jobs().get("j1").await;

    assert_matches!(result, Err(Error::InternalServerError(message)) if message == "worker crashed");
}

#[tokio::test]
async fn test_rate_limited_read_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/ai_model/jobs/j1"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/ai_model/jobs/j1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_detail("README", "# Title")))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::builder()
        .base_url(server.uri())
        .max_retries(1)
        .build()
        .unwrap();

    let detail = client.jobs().get("j1").await.unwrap();
    assert_eq!(detail.result_text, "# Title");
}

#[tokio::test]
async fn test_rate_limit_exposes_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/ai_model/jobs/j1"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&server)
        .await;

    let error = client_for(&server).jobs().get("j1").await.unwrap_err();

    assert!(error.is_retryable());
    assert_eq!(error.retry_after(), Some(std::time::Duration::from_secs(7)));
}

#[tokio::test]
async fn test_submission_is_never_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/ai_model/send_prompt/"))
        .respond_with(ResponseTemplate::new(503).set_body_json(error_detail("No active prompts")))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::builder()
        .base_url(server.uri())
        .max_retries(3)
        .build()
        .unwrap();

    let result = client.batches().submit(&submit_request()).await;

    assert_matches!(result, Err(Error::InternalServerError(message)) if message == "No active prompts");
}

#[tokio::test]
async fn test_connection_refused_maps_to_connection_error() {
    // Nothing listens on port 9 on a test host.
    let client = Client::builder()
        .base_url("http://127.0.0.1:9")
        .max_retries(0)
        .build()
        .unwrap();

    let result = client.batches().get("b1").await;

    assert_matches!(result, Err(Error::Connection(_)));
}
