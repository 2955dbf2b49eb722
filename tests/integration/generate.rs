//! End-to-end generation against a mock GitHub API and data host

use super::common::{
    config_for, mount_category_list, mount_json, mount_rate_limit, read_json, TestRepository,
};
use hacs_data::config::FailurePolicy;
use hacs_data::core::DataError;
use hacs_data::di::mocks::MockQuotaStrategy;
use hacs_data::di::ServiceContainer;
use hacs_data::github::GitHubClient;
use hacs_data::remote::DataClient;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JINJA_MANIFEST: &str = r#"{"name": "test", "filename": "test.jinja"}"#;

#[tokio::test]
async fn test_template_category_replaces_published_records() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_rate_limit(&server).await;
    mount_category_list(&server, "template", &["test/first", "test/second"]).await;
    mount_json(
        &server,
        "/template/data.json",
        json!({
            "999999998": {
                "manifest": {"name": "test"},
                "description": "Old contents",
                "full_name": "test/first",
                "last_commit": "123",
                "etag_repository": "231",
                "stargazers_count": 992,
                "topics": []
            }
        }),
    )
    .await;
    for (id, name) in [(999999998, "test/first"), (999999999, "test/second")] {
        TestRepository::new(id, name)
            .with_file("hacs.json", JINJA_MANIFEST)
            .with_file("test.jinja", "{{ 1 }}")
            .mount(&server)
            .await;
    }

    let container = ServiceContainer::new(config_for(&server, temp.path())).unwrap();
    let summary = container.generator().generate("template", None).await.unwrap();
    assert_eq!(summary.fetched.len(), 2);
    assert!(summary.failed.is_empty());

    let data = read_json(&temp.path().join("template").join("data.json"));
    assert_eq!(data.as_object().unwrap().len(), 2);
    for (id, name) in [("999999998", "test/first"), ("999999999", "test/second")] {
        let record = &data[id];
        assert_eq!(record["manifest"], json!({"name": "test"}));
        assert_eq!(record["description"], json!("Sample description for repository."));
        assert_eq!(record["full_name"], json!(name));
        assert_eq!(record["last_commit"], json!("1234567"));
        assert_eq!(record["stargazers_count"], json!(999));
        assert_eq!(record["topics"], json!(["topic1", "topic2"]));
        assert!(record["last_fetched"].is_number());
        assert!(record.get("etag_repository").is_none());
    }

    let repositories = read_json(&temp.path().join("template").join("repositories.json"));
    assert_eq!(repositories, json!(["test/first", "test/second"]));
}

#[tokio::test]
async fn test_single_integration_repository() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_rate_limit(&server).await;
    TestRepository::new(42, "hacs-test-org/integration-basic")
        .with_file("hacs.json", r#"{"name": "Basic", "homeassistant": "2024.1.0"}"#)
        .with_file(
            "custom_components/basic/manifest.json",
            r#"{"domain": "basic", "name": "Basic"}"#,
        )
        .mount(&server)
        .await;

    let container = ServiceContainer::new(config_for(&server, temp.path())).unwrap();
    container
        .generator()
        .generate("integration", Some("hacs-test-org/integration-basic"))
        .await
        .unwrap();

    let data = read_json(&temp.path().join("integration").join("data.json"));
    let record = &data["42"];
    assert_eq!(record["full_name"], json!("hacs-test-org/integration-basic"));
    assert_eq!(
        record["manifest"],
        json!({"name": "Basic", "homeassistant": "2024.1.0"})
    );
    assert_eq!(record["domain"], json!("basic"));

    let repositories = read_json(&temp.path().join("integration").join("repositories.json"));
    assert_eq!(repositories, json!(["hacs-test-org/integration-basic"]));
}

#[tokio::test]
async fn test_removed_repository_purged() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_rate_limit(&server).await;
    mount_category_list(&server, "plugin", &["test/first", "test/gone"]).await;
    mount_json(&server, "/removed/repositories.json", json!(["Test/Gone"])).await;
    mount_json(
        &server,
        "/plugin/data.json",
        json!({"7": {"full_name": "test/gone", "last_commit": "abcdefg"}}),
    )
    .await;
    TestRepository::new(1, "test/first").mount(&server).await;

    let container = ServiceContainer::new(config_for(&server, temp.path())).unwrap();
    let summary = container.generator().generate("plugin", None).await.unwrap();
    assert_eq!(summary.total, 1);

    let data = read_json(&temp.path().join("plugin").join("data.json"));
    assert!(data.get("7").is_none());
    let repositories = read_json(&temp.path().join("plugin").join("repositories.json"));
    assert_eq!(repositories, json!(["test/first"]));
}

#[tokio::test]
async fn test_failing_repository_skipped_or_aborted() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_rate_limit(&server).await;
    mount_category_list(&server, "theme", &["test/broken", "test/first"]).await;
    mount_json(
        &server,
        "/theme/data.json",
        json!({"5": {"full_name": "test/broken", "last_commit": "abcdefg", "stargazers_count": 3}}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/repos/test/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    TestRepository::new(1, "test/first").mount(&server).await;

    let container = ServiceContainer::new(config_for(&server, temp.path())).unwrap();

    let err = container
        .generator()
        .with_failure_policy(FailurePolicy::Abort)
        .generate("theme", None)
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Fetch { .. }));
    assert!(!temp.path().join("theme").join("data.json").exists());

    let summary = container.generator().generate("theme", None).await.unwrap();
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "test/broken");

    let data = read_json(&temp.path().join("theme").join("data.json"));
    assert_eq!(data["5"]["stargazers_count"], json!(3));
    assert_eq!(data["1"]["stargazers_count"], json!(999));
}

#[tokio::test]
async fn test_exhausted_quota_is_waited_out() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_rate_limit(&server).await;
    Mock::given(method("GET"))
        .and(path("/repos/test/first"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-ratelimit-reset", "0"),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    TestRepository::new(1, "test/first").mount(&server).await;

    let config = config_for(&server, temp.path());
    let strategy = Arc::new(MockQuotaStrategy::new());
    let container = ServiceContainer::with_providers(
        Arc::new(config.clone()),
        Arc::new(GitHubClient::new(&config).unwrap()),
        Arc::new(DataClient::new(&config).unwrap()),
        strategy.clone(),
    );

    let summary = container
        .generator()
        .generate("appdaemon", Some("test/first"))
        .await
        .unwrap();
    assert_eq!(summary.fetched, vec!["test/first"]);
    assert_eq!(strategy.waits(), 1);
}
