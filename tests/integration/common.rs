//! Common utilities for integration tests

use base64::Engine;
use hacs_data::config::Config;
use serde_json::{json, Value};
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const HEAD_SHA: &str = "1234567890123456789012345678901234567890";

/// Config pointing both the GitHub API and the data host at `server`
pub fn config_for(server: &MockServer, output_dir: &Path) -> Config {
    Config {
        api_url: server.uri(),
        data_url: server.uri(),
        output_dir: output_dir.to_path_buf(),
        request_timeout_secs: 5,
        ..Default::default()
    }
}

pub fn contents_body(content: &str) -> Value {
    json!({
        "content": base64::engine::general_purpose::STANDARD.encode(content),
        "encoding": "base64"
    })
}

pub async fn mount_json(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_rate_limit(server: &MockServer) {
    mount_json(
        server,
        "/rate_limit",
        json!({"resources": {"core": {"limit": 5000, "remaining": 4999, "reset": 0}}}),
    )
    .await;
}

pub async fn mount_category_list(server: &MockServer, category: &str, names: &[&str]) {
    mount_json(
        server,
        &format!("/repos/hacs/default/contents/{}", category),
        contents_body(&serde_json::to_string(names).unwrap()),
    )
    .await;
}

/// A repository served by the mock GitHub API
pub struct TestRepository {
    pub id: u64,
    pub full_name: String,
    pub files: Vec<(String, String)>,
}

impl TestRepository {
    /// Repository with `hacs.json` naming "test" and an empty readme
    pub fn new(id: u64, full_name: &str) -> Self {
        Self {
            id,
            full_name: full_name.to_string(),
            files: vec![
                ("hacs.json".to_string(), r#"{"name": "test"}"#.to_string()),
                ("readme.md".to_string(), String::new()),
            ],
        }
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.retain(|(p, _)| p != path);
        self.files.push((path.to_string(), content.to_string()));
        self
    }

    pub async fn mount(&self, server: &MockServer) {
        let base = format!("/repos/{}", self.full_name);

        mount_json(
            server,
            &base,
            json!({
                "id": self.id,
                "full_name": self.full_name,
                "default_branch": "main",
                "description": "Sample description for repository.",
                "stargazers_count": 999,
                "topics": ["topic1", "topic2"],
                "archived": false
            }),
        )
        .await;
        mount_json(
            server,
            &format!("{}/branches/main", base),
            json!({"name": "main", "commit": {"sha": HEAD_SHA}}),
        )
        .await;

        let tree: Vec<Value> = self
            .files
            .iter()
            .map(|(p, _)| json!({"path": p, "type": "blob"}))
            .collect();
        mount_json(
            server,
            &format!("{}/git/trees/main", base),
            json!({"tree": tree, "truncated": false}),
        )
        .await;
        mount_json(server, &format!("{}/releases", base), json!([])).await;

        for (file, content) in &self.files {
            mount_json(
                server,
                &format!("{}/contents/{}", base, file),
                contents_body(content),
            )
            .await;
        }
    }
}

pub fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}
