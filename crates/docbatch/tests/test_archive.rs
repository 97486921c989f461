//! Exporting stored results of the newest batch

use docbatch::{DirectorySink, ResultsArchive};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{active_prompts, client_for, result_listing, stored_result};

async fn mount_result(server: &MockServer, body: serde_json::Value) {
    let id = body["id"].as_u64().unwrap();
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/ai_model/results/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_exports_finished_results_of_newest_batch() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/prompts/"))
        .and(query_param("is_active", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(active_prompts(&["README", "API docs", "Changelog"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/ai_model/results"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(result_listing(&[12, 11, 10])))
        .expect(1)
        .mount(&server)
        .await;
    mount_result(&server, stored_result(12, "b9", "finished", "README", "# Readme")).await;
    mount_result(&server, stored_result(11, "b9", "failed", "API docs", "")).await;
    mount_result(&server, stored_result(10, "b8", "finished", "Changelog", "# Old")).await;

    let archive = ResultsArchive::new(client_for(&server));
    let sink = DirectorySink::new(dir.path());
    let summary = archive.export_latest_batch(&sink).await.unwrap();

    assert_eq!(summary.batch_id.as_deref(), Some("b9"));
    assert_eq!(summary.saved, vec!["README.md".to_string()]);
    assert_eq!(summary.skipped, 1);
    assert_eq!(std::fs::read_to_string(dir.path().join("README.md")).unwrap(), "# Readme");
    assert!(!dir.path().join("Changelog.md").exists());
}

#[tokio::test]
async fn test_unsafe_prompt_names_are_sanitised() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/prompts/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(active_prompts(&["API docs/v2"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/ai_model/results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(result_listing(&[5])))
        .mount(&server)
        .await;
    mount_result(&server, stored_result(5, "b1", "finished", "API docs/v2", "# Api")).await;

    let summary = ResultsArchive::new(client_for(&server))
        .export_latest_batch(&DirectorySink::new(dir.path()))
        .await
        .unwrap();

    assert_eq!(summary.saved, vec!["API_docs_v2.md".to_string()]);
    assert!(dir.path().join("API_docs_v2.md").exists());
}

#[tokio::test]
async fn test_empty_listing_exports_nothing() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/prompts/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(active_prompts(&[])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/ai_model/results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(result_listing(&[])))
        .mount(&server)
        .await;

    let summary = ResultsArchive::new(client_for(&server))
        .export_latest_batch(&DirectorySink::new(dir.path()))
        .await
        .unwrap();

    assert_eq!(summary.batch_id, None);
    assert!(summary.saved.is_empty());
}
