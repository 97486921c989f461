//! Client and resource tests against a mock service
//!
//! - Request shape (paths, bearer auth, JSON bodies, query strings)
//! - Response decoding into typed snapshots and details
//! - Base URL validation

use docbatch::config::{ConnectionPoolConfig, RateLimitConfig};
use docbatch::{BatchStatus, Client, ClientConfig, Error, JobStatus, SubmitRequest};
use std::time::Duration;
use pretty_assertions::assert_eq;
use rstest::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{batch_status, client_for, job_detail, mock_server, submit_ack, TEST_AUTH_TOKEN};

#[rstest]
#[tokio::test]
async fn test_submit_posts_json_body_with_bearer_token(#[future] mock_server: MockServer) {
    let server = mock_server.await;

    Mock::given(method("POST"))
        .and(path("/api/v1/ai_model/send_prompt/"))
        .and(header("authorization", format!("Bearer {}", TEST_AUTH_TOKEN).as_str()))
        .and(body_json(json!({
            "ai_model": "chatgpt",
            "model": "gpt-4o-mini",
            "request": "fn main() {}",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(submit_ack("b1", &[("j1", "README")])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = SubmitRequest::builder()
        .ai_model("chatgpt")
        .model("gpt-4o-mini")
        .request("fn main() {}")
        .build()
        .unwrap();

    let ack = client.batches().submit(&request).await.unwrap();

    assert_eq!(ack.batch_id, "b1");
    assert_eq!(ack.total, 1);
    assert_eq!(ack.jobs[0].prompt_name, "README");
}

#[rstest]
#[tokio::test]
async fn test_batch_status_decodes_snapshot(#[future] mock_server: MockServer) {
    let server = mock_server.await;

    Mock::given(method("GET"))
        .and(path("/api/v1/ai_model/batch/b1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(batch_status(
            "b1",
            "processing",
            1,
            &[("j1", "finished"), ("j2", "failed"), ("j3", "deferred")],
        )))
        .mount(&server)
        .await;

    let snapshot = client_for(&server).batches().get("b1").await.unwrap();

    assert_eq!(snapshot.batch_id.as_deref(), Some("b1"));
    assert_eq!(snapshot.status, BatchStatus::Processing);
    assert_eq!(snapshot.total_jobs, 3);
    assert_eq!(snapshot.jobs[1].error_message.as_deref(), Some("model quota exceeded"));
    assert_eq!(snapshot.jobs[2].status, JobStatus::Queued);
}

#[rstest]
#[tokio::test]
async fn test_job_detail_decodes(#[future] mock_server: MockServer) {
    let server = mock_server.await;

    Mock::given(method("GET"))
        .and(path("/api/v1/ai_model/jobs/j1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_detail("README", "# Title")))
        .mount(&server)
        .await;

    let detail = client_for(&server).jobs().get("j1").await.unwrap();

    assert_eq!(detail.status, Some(JobStatus::Finished));
    assert_eq!(detail.total_tokens, 1234);
    assert_eq!(detail.result_text, "# Title");
    assert_eq!(detail.prompt_name, "README");
}

#[rstest]
#[tokio::test]
async fn test_result_listing_sends_limit(#[future] mock_server: MockServer) {
    let server = mock_server.await;

    Mock::given(method("GET"))
        .and(path("/api/v1/ai_model/results"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 9}, {"id": 8}])))
        .expect(1)
        .mount(&server)
        .await;

    let listed = client_for(&server).results().list(2).await.unwrap();

    assert_eq!(listed.iter().map(|r| r.id).collect::<Vec<_>>(), vec![9, 8]);
}

#[tokio::test]
async fn test_base_url_with_path_prefix_is_kept() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/backend/api/v1/ai_model/jobs/j1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_detail("README", "ok")))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::builder()
        .base_url(format!("{}/backend", server.uri()))
        .max_retries(0)
        .build()
        .unwrap();

    client.jobs().get("j1").await.unwrap();
}

#[tokio::test]
async fn test_client_from_config_sends_default_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/ai_model/jobs/j1"))
        .and(header("x-team", "docs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_detail("README", "ok")))
        .expect(2)
        .mount(&server)
        .await;

    let mut config = ClientConfig::with_base_url(server.uri())
        .with_connection_pool(ConnectionPoolConfig {
            max_idle_per_host: 2,
            idle_timeout: Duration::from_secs(5),
            tcp_keepalive: None,
        })
        .with_rate_limiting(RateLimitConfig {
            requests_per_second: 50.0,
            burst_size: 2,
        });
    config.default_headers.insert("x-team", "docs".parse().unwrap());
    let client = Client::from_config(config).unwrap();

    client.jobs().get("j1").await.unwrap();
    client.jobs().get("j1").await.unwrap();
}

#[rstest]
#[case("")]
#[case("ftp://files.example.com")]
#[case("not a url")]
fn test_invalid_base_url_rejected(#[case] base_url: &str) {
    let result = Client::new(base_url);
    assert!(matches!(result, Err(Error::InvalidUrl(_))), "{:?}", result);
}

#[test]
fn test_debug_hides_auth_token() {
    let client = Client::builder()
        .auth_token("super-secret")
        .base_url("http://localhost:8000")
        .build()
        .unwrap();

    let debug = format!("{:?}", client);
    assert!(!debug.contains("super-secret"));
}
