use crate::core::{DataError, DataResult};
use crate::di::traits::GitHubProvider;
use crate::github::quota::QuotaGuard;
use crate::github::types::GitHubTree;
use crate::repository::manifest::{HacsManifest, MANIFEST_FILE};
use crate::repository::record::{short_sha, RepositoryRecord};
use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Readme fetched when the tree has none at its root
const DEFAULT_README: &str = "readme.md";

/// Category whose repositories carry `custom_components/<domain>/manifest.json`
const INTEGRATION_CATEGORY: &str = "integration";

/// A freshly fetched record and the repository id it is stored under
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedRepository {
    pub id: String,
    pub record: RepositoryRecord,
}

/// Fetches and normalizes the metadata of one repository
///
/// Every step is a separate API call made through the [`QuotaGuard`], so an
/// exhausted quota is waited out and the same call repeated. Any other
/// failure aborts the fetch of that repository only.
pub struct RepositoryFetcher {
    github: Arc<dyn GitHubProvider>,
    quota: QuotaGuard,
    category: Option<String>,
}

impl RepositoryFetcher {
    pub fn new(github: Arc<dyn GitHubProvider>, quota: QuotaGuard) -> Self {
        Self {
            github,
            quota,
            category: None,
        }
    }

    /// Enable category specific lookups (the integration domain)
    pub fn for_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    /// Fetch `owner/name` into a record
    ///
    /// Errors are wrapped in `DataError::Fetch` naming the repository.
    pub async fn fetch(&self, full_name: &str) -> DataResult<FetchedRepository> {
        self.fetch_inner(full_name)
            .await
            .map_err(|e| DataError::fetch(full_name, e))
    }

    async fn fetch_inner(&self, full_name: &str) -> DataResult<FetchedRepository> {
        let github = &self.github;
        debug!("Fetching {}", full_name);

        let repo = self.quota.retry(|| github.get_repo(full_name)).await?;
        let branch_name = repo.default_branch.clone();

        let branch = self
            .quota
            .retry(|| github.get_branch(full_name, &branch_name))
            .await?;
        let last_commit = short_sha(&branch.commit.sha).ok_or_else(|| {
            DataError::Decode(format!(
                "Head commit of {} is not a valid SHA: {:?}",
                branch_name, branch.commit.sha
            ))
        })?;

        let tree = self
            .quota
            .retry(|| github.get_tree(full_name, &branch_name))
            .await?;
        if tree.truncated {
            warn!("Tree listing of {} is truncated", full_name);
        }
        if !tree.contains_file(MANIFEST_FILE) {
            return Err(DataError::ManifestMissing(format!(
                "{} has no {} at its root",
                full_name, MANIFEST_FILE
            )));
        }

        let releases = self.quota.retry(|| github.get_releases(full_name)).await?;
        let last_version = releases
            .iter()
            .find(|r| !r.draft && !r.prerelease)
            .map(|r| r.tag_name.clone());
        debug!("{} has {} releases", full_name, releases.len());

        let manifest_content = self
            .quota
            .retry(|| github.get_file_content(full_name, MANIFEST_FILE))
            .await?;
        let manifest = HacsManifest::parse(&manifest_content)?;
        if let Some(filename) = manifest.filename.as_deref() {
            if declared_file_path(&tree, filename, self.category.as_deref()).is_none() {
                return Err(DataError::ManifestMissing(format!(
                    "{} declares {} but it is not in the tree",
                    full_name, filename
                )));
            }
        }

        let readme = readme_path(&tree);
        let readme_content = self
            .quota
            .retry(|| github.get_file_content(full_name, &readme))
            .await?;
        debug!("{} readme is {} bytes", full_name, readme_content.len());

        let domain = if self.category.as_deref() == Some(INTEGRATION_CATEGORY) {
            self.integration_domain(full_name, &tree).await?
        } else {
            None
        };

        self.quota.ensure().await?;

        Ok(FetchedRepository {
            id: repo.id.to_string(),
            record: RepositoryRecord {
                manifest: manifest.exported(),
                description: repo.description.unwrap_or_default(),
                full_name: repo.full_name,
                last_commit,
                stargazers_count: repo.stargazers_count,
                topics: repo.topics,
                last_fetched: Some(now_timestamp()),
                last_version,
                domain,
                extra: Map::new(),
            },
        })
    }

    /// Domain declared by `custom_components/<domain>/manifest.json`
    ///
    /// A missing or unreadable manifest is not fatal; only an exhausted
    /// quota is passed on.
    async fn integration_domain(
        &self,
        full_name: &str,
        tree: &GitHubTree,
    ) -> DataResult<Option<String>> {
        let Some(path) = integration_manifest_path(tree) else {
            warn!("{} has no custom_components/*/manifest.json", full_name);
            return Ok(None);
        };

        let github = &self.github;
        match self
            .quota
            .retry(|| github.get_file_content(full_name, path))
            .await
        {
            Ok(content) => {
                let domain = serde_json::from_str::<Value>(&content)
                    .ok()
                    .and_then(|v| v.get("domain").and_then(Value::as_str).map(str::to_string));
                if domain.is_none() {
                    warn!("{} in {} has no domain", path, full_name);
                }
                Ok(domain)
            }
            Err(e) if e.is_quota_exhausted() => Err(e),
            Err(e) => {
                warn!("Could not read {} in {}: {}", path, full_name, e);
                Ok(None)
            }
        }
    }
}

/// Root readme file name from the tree, matched case-insensitively
fn readme_path(tree: &GitHubTree) -> String {
    tree.files()
        .filter(|entry| !entry.path.contains('/'))
        .find(|entry| {
            let lower = entry.path.to_lowercase();
            lower == "readme.md" || lower == "readme"
        })
        .map(|entry| entry.path.clone())
        .unwrap_or_else(|| DEFAULT_README.to_string())
}

/// Folder a category keeps its content in, when not at the root
fn category_folder(category: &str) -> Option<&'static str> {
    match category {
        "appdaemon" | "netdaemon" => Some("apps"),
        "integration" => Some("custom_components"),
        "plugin" => Some("dist"),
        "python_script" => Some("python_scripts"),
        "theme" => Some("themes"),
        _ => None,
    }
}

/// Tree path of the file a manifest declares, looked up at the root or
/// below the category folder
fn declared_file_path<'a>(
    tree: &'a GitHubTree,
    filename: &str,
    category: Option<&str>,
) -> Option<&'a str> {
    let folder = category.and_then(category_folder);
    tree.files()
        .filter(|entry| entry.file_name() == filename)
        .map(|entry| entry.path.as_str())
        .find(|path| {
            *path == filename
                || folder.is_some_and(|dir| {
                    path.strip_prefix(dir)
                        .is_some_and(|rest| rest.starts_with('/'))
                })
        })
}

fn integration_manifest_path(tree: &GitHubTree) -> Option<&str> {
    tree.files()
        .map(|entry| entry.path.as_str())
        .find(|path| {
            let parts: Vec<&str> = path.split('/').collect();
            parts.len() == 3 && parts[0] == "custom_components" && parts[2] == "manifest.json"
        })
}

fn now_timestamp() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::mocks::{MockGitHubProvider, MockQuotaStrategy, MockRepository};
    use crate::github::quota::NoWait;
    use serde_json::json;

    fn fetcher(github: Arc<MockGitHubProvider>) -> RepositoryFetcher {
        let quota = QuotaGuard::new(github.clone(), Arc::new(NoWait));
        RepositoryFetcher::new(github, quota)
    }

    fn tree(paths: &[&str]) -> GitHubTree {
        serde_json::from_value(json!({
            "tree": paths
                .iter()
                .map(|p| json!({"path": p, "type": "blob"}))
                .collect::<Vec<_>>()
        }))
        .unwrap()
    }

    #[test]
    fn test_readme_path_prefers_tree_entry() {
        assert_eq!(readme_path(&tree(&["hacs.json", "README.md"])), "README.md");
        assert_eq!(readme_path(&tree(&["hacs.json", "docs/readme.md"])), "readme.md");
    }

    #[test]
    fn test_integration_manifest_path() {
        let t = tree(&["hacs.json", "custom_components/demo/manifest.json"]);
        assert_eq!(
            integration_manifest_path(&t),
            Some("custom_components/demo/manifest.json")
        );
        assert_eq!(integration_manifest_path(&tree(&["manifest.json"])), None);
    }

    #[test]
    fn test_declared_file_path_root_or_category_folder() {
        let t = tree(&[
            "hacs.json",
            "themes/dark.yaml",
            "dist/card.js",
            "docs/examples/card.js",
        ]);

        assert_eq!(
            declared_file_path(&t, "dark.yaml", Some("theme")),
            Some("themes/dark.yaml")
        );
        assert_eq!(
            declared_file_path(&t, "card.js", Some("plugin")),
            Some("dist/card.js")
        );
        assert_eq!(declared_file_path(&t, "card.js", Some("theme")), None);
        assert_eq!(declared_file_path(&t, "dark.yaml", None), None);
        assert_eq!(declared_file_path(&t, "hacs.json", Some("template")), Some("hacs.json"));
        assert_eq!(
            declared_file_path(&tree(&["themesx/dark.yaml"]), "dark.yaml", Some("theme")),
            None
        );
    }

    #[tokio::test]
    async fn test_fetch_declared_filename_outside_category_folder() {
        let github = Arc::new(MockGitHubProvider::new());
        github.add_repository(
            MockRepository::new(1, "test/card")
                .with_file("hacs.json", r#"{"name": "test", "filename": "card.js"}"#)
                .with_tree_file("examples/card.js"),
        );

        let err = fetcher(github)
            .for_category("plugin")
            .fetch("test/card")
            .await
            .unwrap_err();
        assert!(matches!(err.root(), DataError::ManifestMissing(_)));
    }

    #[tokio::test]
    async fn test_fetch_builds_record() {
        let github = Arc::new(MockGitHubProvider::new());
        github.add_repository(
            MockRepository::new(999999998, "test/first")
                .with_file("hacs.json", r#"{"name": "test", "filename": "test.jinja"}"#)
                .with_tree_file("test.jinja"),
        );

        let fetched = fetcher(github.clone()).fetch("test/first").await.unwrap();

        assert_eq!(fetched.id, "999999998");
        let record = fetched.record;
        assert_eq!(record.full_name, "test/first");
        assert_eq!(record.last_commit, "1234567");
        assert_eq!(record.stargazers_count, 999);
        assert_eq!(record.topics, vec!["topic1", "topic2"]);
        assert_eq!(record.description, "Sample description for repository.");
        assert_eq!(serde_json::Value::Object(record.manifest), json!({"name": "test"}));
        assert!(record.last_fetched.is_some());
        assert!(record.last_version.is_none());
        assert!(record.domain.is_none());
    }

    #[tokio::test]
    async fn test_fetch_calls_in_order() {
        let github = Arc::new(MockGitHubProvider::new());
        github.add_repository(MockRepository::new(1, "test/first"));

        fetcher(github.clone()).fetch("test/first").await.unwrap();

        assert_eq!(
            github.calls(),
            vec![
                "repo test/first",
                "branch test/first main",
                "tree test/first main",
                "releases test/first",
                "content test/first hacs.json",
                "content test/first readme.md",
                "rate_limit",
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_last_version_skips_drafts() {
        let github = Arc::new(MockGitHubProvider::new());
        github.add_repository(
            MockRepository::new(1, "test/first")
                .with_release("v2.0.0-beta", false, true)
                .with_release("v1.9.0", true, false)
                .with_release("v1.8.0", false, false),
        );

        let fetched = fetcher(github).fetch("test/first").await.unwrap();
        assert_eq!(fetched.record.last_version.as_deref(), Some("v1.8.0"));
    }

    #[tokio::test]
    async fn test_fetch_missing_manifest_in_tree() {
        let github = Arc::new(MockGitHubProvider::new());
        github.add_repository(MockRepository::new(1, "test/first").without_tree_file("hacs.json"));

        let err = fetcher(github).fetch("test/first").await.unwrap_err();
        assert!(matches!(err.root(), DataError::ManifestMissing(_)));
        assert!(err.to_string().contains("test/first"));
    }

    #[tokio::test]
    async fn test_fetch_declared_filename_missing() {
        let github = Arc::new(MockGitHubProvider::new());
        github.add_repository(
            MockRepository::new(1, "test/first")
                .with_file("hacs.json", r#"{"name": "test", "filename": "card.js"}"#),
        );

        let err = fetcher(github).fetch("test/first").await.unwrap_err();
        assert!(matches!(err.root(), DataError::ManifestMissing(_)));
    }

    #[tokio::test]
    async fn test_fetch_short_sha_is_decode_error() {
        let github = Arc::new(MockGitHubProvider::new());
        github.add_repository(MockRepository::new(1, "test/first").with_head_sha("abc"));

        let err = fetcher(github).fetch("test/first").await.unwrap_err();
        assert!(matches!(err.root(), DataError::Decode(_)));
    }

    #[tokio::test]
    async fn test_fetch_unknown_repository() {
        let github = Arc::new(MockGitHubProvider::new());

        let err = fetcher(github).fetch("test/missing").await.unwrap_err();
        assert!(matches!(err.root(), DataError::Network(_)));
    }

    #[tokio::test]
    async fn test_fetch_integration_domain() {
        let github = Arc::new(MockGitHubProvider::new());
        github.add_repository(
            MockRepository::new(1, "test/integration")
                .with_file("custom_components/demo/manifest.json", r#"{"domain": "demo"}"#),
        );

        let fetched = fetcher(github)
            .for_category("integration")
            .fetch("test/integration")
            .await
            .unwrap();
        assert_eq!(fetched.record.domain.as_deref(), Some("demo"));
    }

    #[tokio::test]
    async fn test_fetch_retries_after_quota_reset() {
        let github = Arc::new(MockGitHubProvider::new());
        github.add_repository(MockRepository::new(1, "test/first"));
        github.exhaust_quota_for("repo test/first", 1);

        let strategy = Arc::new(MockQuotaStrategy::new());
        let quota = QuotaGuard::new(github.clone(), strategy.clone());
        let fetched = RepositoryFetcher::new(github.clone(), quota)
            .fetch("test/first")
            .await
            .unwrap();

        assert_eq!(fetched.id, "1");
        assert_eq!(strategy.waits(), 1);
        let repo_calls = github.calls().iter().filter(|c| *c == "repo test/first").count();
        assert_eq!(repo_calls, 2);
    }
}
