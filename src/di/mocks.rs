//! Mock implementations of service traits for testing

use super::traits::{ConfigProvider, DataProvider, GitHubProvider, QuotaStrategy};
use crate::category::snapshot::CategorySnapshot;
use crate::config::FailurePolicy;
use crate::core::{DataError, DataResult};
use crate::github::types::{
    BranchCommit, GitHubBranch, GitHubRelease, GitHubRepo, GitHubTree, RateLimit, TreeEntry,
    TreeEntryType,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Head commit every mock repository reports unless overridden
pub const MOCK_HEAD_SHA: &str = "1234567890123456789012345678901234567890";

/// Mock configuration provider for testing
///
/// # Example
///
/// ```
/// use hacs_data::config::FailurePolicy;
/// use hacs_data::di::mocks::MockConfigProvider;
/// use hacs_data::di::ConfigProvider;
///
/// let mut config = MockConfigProvider::default();
/// config.failure_policy = FailurePolicy::Abort;
///
/// assert_eq!(config.failure_policy(), FailurePolicy::Abort);
/// ```
#[derive(Clone)]
pub struct MockConfigProvider {
    pub api_url: String,
    pub data_url: String,
    pub reference_repository: String,
    pub output_dir: PathBuf,
    pub token: Option<String>,
    pub failure_policy: FailurePolicy,
    pub quota_max_wait: Duration,
}

impl Default for MockConfigProvider {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            data_url: "https://data-v2.hacs.xyz".to_string(),
            reference_repository: "hacs/default".to_string(),
            output_dir: PathBuf::from("/tmp/hacs-data-test"),
            token: None,
            failure_policy: FailurePolicy::Skip,
            quota_max_wait: Duration::ZERO,
        }
    }
}

impl ConfigProvider for MockConfigProvider {
    fn api_url(&self) -> &str {
        &self.api_url
    }

    fn data_url(&self) -> &str {
        &self.data_url
    }

    fn reference_repository(&self) -> &str {
        &self.reference_repository
    }

    fn output_dir(&self) -> PathBuf {
        self.output_dir.clone()
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    fn quota_max_wait(&self) -> Duration {
        self.quota_max_wait
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(5)
    }
}

/// A repository served by [`MockGitHubProvider`]
///
/// Defaults match the sample repository used across the tests: 999 stars,
/// topics `topic1`/`topic2`, branch `main`, a `hacs.json` naming "test" and
/// an empty `readme.md`.
#[derive(Clone, Debug)]
pub struct MockRepository {
    repo: GitHubRepo,
    head_sha: String,
    tree: Vec<String>,
    files: HashMap<String, String>,
    releases: Vec<GitHubRelease>,
}

impl MockRepository {
    pub fn new(id: u64, full_name: &str) -> Self {
        let mut files = HashMap::new();
        files.insert("hacs.json".to_string(), r#"{"name": "test"}"#.to_string());
        files.insert("readme.md".to_string(), String::new());

        Self {
            repo: GitHubRepo {
                id,
                full_name: full_name.to_string(),
                default_branch: "main".to_string(),
                description: Some("Sample description for repository.".to_string()),
                stargazers_count: 999,
                topics: vec!["topic1".to_string(), "topic2".to_string()],
            },
            head_sha: MOCK_HEAD_SHA.to_string(),
            tree: vec!["hacs.json".to_string(), "readme.md".to_string()],
            files,
            releases: Vec::new(),
        }
    }

    /// Serve `content` at `path` and list it in the tree
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(path.to_string(), content.to_string());
        self.with_tree_file(path)
    }

    /// List `path` in the tree without serving content for it
    pub fn with_tree_file(mut self, path: &str) -> Self {
        if !self.tree.iter().any(|p| p == path) {
            self.tree.push(path.to_string());
        }
        self
    }

    pub fn without_tree_file(mut self, path: &str) -> Self {
        self.tree.retain(|p| p != path);
        self
    }

    pub fn with_release(mut self, tag: &str, draft: bool, prerelease: bool) -> Self {
        self.releases.push(GitHubRelease {
            tag_name: tag.to_string(),
            name: None,
            draft,
            prerelease,
            published_at: None,
        });
        self
    }

    pub fn with_head_sha(mut self, sha: &str) -> Self {
        self.head_sha = sha.to_string();
        self
    }

    fn tree(&self) -> GitHubTree {
        GitHubTree {
            tree: self
                .tree
                .iter()
                .map(|path| TreeEntry {
                    path: path.clone(),
                    entry_type: TreeEntryType::Blob,
                })
                .collect(),
            truncated: false,
        }
    }
}

/// Mock GitHub provider for testing
///
/// Serves pre-registered repositories from memory and records every call as
/// a short label (`"repo owner/name"`, `"content owner/name path"`, ...).
///
/// # Example
///
/// ```
/// use hacs_data::di::mocks::{MockGitHubProvider, MockRepository};
///
/// let github = MockGitHubProvider::new();
/// github.add_repository(MockRepository::new(1, "test/first"));
/// github.add_category_list("hacs/default", "template", &["test/first"]);
/// ```
#[derive(Clone, Default)]
pub struct MockGitHubProvider {
    repositories: Arc<Mutex<HashMap<String, MockRepository>>>,
    aliases: Arc<Mutex<HashMap<String, String>>>,
    rate_limits: Arc<Mutex<VecDeque<RateLimit>>>,
    exhausted: Arc<Mutex<HashMap<String, u32>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockGitHubProvider {
    /// Create a new mock GitHub provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository
    pub fn add_repository(&self, repository: MockRepository) {
        self.repositories
            .lock()
            .unwrap()
            .insert(repository.repo.full_name.to_lowercase(), repository);
    }

    /// Answer requests for `alias` with the repository registered as
    /// `target`, the way GitHub redirects a renamed repository
    pub fn alias_repository(&self, alias: &str, target: &str) {
        self.aliases
            .lock()
            .unwrap()
            .insert(alias.to_lowercase(), target.to_lowercase());
    }

    /// Serve a category list file from the reference repository
    pub fn add_category_list(&self, reference: &str, category: &str, names: &[&str]) {
        let content = serde_json::to_string(names).unwrap_or_default();
        let key = reference.to_lowercase();
        let mut repositories = self.repositories.lock().unwrap();
        let existing = repositories
            .remove(&key)
            .unwrap_or_else(|| MockRepository::new(0, reference));
        repositories.insert(key, existing.with_file(category, &content));
    }

    /// Queue a quota answer for the next `/rate_limit` call
    pub fn push_rate_limit(&self, limit: RateLimit) {
        self.rate_limits.lock().unwrap().push_back(limit);
    }

    /// Answer the call labelled `call` with an exhausted quota `times` times
    pub fn exhaust_quota_for(&self, call: &str, times: u32) {
        self.exhausted
            .lock()
            .unwrap()
            .insert(call.to_string(), times);
    }

    /// Make the call labelled `call` fail with a server error
    pub fn fail_call(&self, call: &str) {
        self.failing.lock().unwrap().insert(call.to_string());
    }

    /// Labels of all calls made so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> DataResult<()> {
        self.calls.lock().unwrap().push(call.clone());

        if let Some(times) = self.exhausted.lock().unwrap().get_mut(&call) {
            if *times > 0 {
                *times -= 1;
                return Err(DataError::QuotaExhausted { reset: 0 });
            }
        }

        if self.failing.lock().unwrap().contains(&call) {
            return Err(DataError::Network(format!("HTTP 500 Internal Server Error for {}", call)));
        }
        Ok(())
    }

    fn repository(&self, full_name: &str) -> DataResult<MockRepository> {
        let key = full_name.to_lowercase();
        let key = self.aliases.lock().unwrap().get(&key).cloned().unwrap_or(key);
        self.repositories
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| DataError::Network(format!("HTTP 404 Not Found for {}", full_name)))
    }
}

#[async_trait]
impl GitHubProvider for MockGitHubProvider {
    async fn get_repo(&self, full_name: &str) -> DataResult<GitHubRepo> {
        self.record(format!("repo {}", full_name))?;
        Ok(self.repository(full_name)?.repo)
    }

    async fn get_branch(&self, full_name: &str, branch: &str) -> DataResult<GitHubBranch> {
        self.record(format!("branch {} {}", full_name, branch))?;
        let repository = self.repository(full_name)?;
        Ok(GitHubBranch {
            name: Some(branch.to_string()),
            commit: BranchCommit {
                sha: repository.head_sha,
            },
        })
    }

    async fn get_tree(&self, full_name: &str, ref_: &str) -> DataResult<GitHubTree> {
        self.record(format!("tree {} {}", full_name, ref_))?;
        Ok(self.repository(full_name)?.tree())
    }

    async fn get_releases(&self, full_name: &str) -> DataResult<Vec<GitHubRelease>> {
        self.record(format!("releases {}", full_name))?;
        Ok(self.repository(full_name)?.releases)
    }

    async fn get_file_content(&self, full_name: &str, path: &str) -> DataResult<String> {
        self.record(format!("content {} {}", full_name, path))?;
        self.repository(full_name)?
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| {
                DataError::Network(format!("HTTP 404 Not Found for {}/{}", full_name, path))
            })
    }

    async fn get_rate_limit(&self) -> DataResult<RateLimit> {
        self.record("rate_limit".to_string())?;
        Ok(self
            .rate_limits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(RateLimit {
                limit: 5000,
                remaining: 4999,
                reset: 0,
            }))
    }
}

/// Mock data host for testing
///
/// Categories without registered data are served as empty snapshots.
#[derive(Clone, Default)]
pub struct MockDataProvider {
    categories: Arc<Mutex<BTreeMap<String, CategorySnapshot>>>,
    removed: Arc<Mutex<Vec<String>>>,
    unavailable: Arc<Mutex<bool>>,
}

impl MockDataProvider {
    /// Create a new mock data provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a snapshot for a category
    pub fn add_category_data(&self, category: &str, snapshot: CategorySnapshot) {
        self.categories
            .lock()
            .unwrap()
            .insert(category.to_string(), snapshot);
    }

    /// Mark a repository as removed
    pub fn add_removed(&self, full_name: &str) {
        self.removed.lock().unwrap().push(full_name.to_string());
    }

    /// Make every request fail with a server error
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    fn check_available(&self) -> DataResult<()> {
        if *self.unavailable.lock().unwrap() {
            return Err(DataError::Network("HTTP 503 Service Unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DataProvider for MockDataProvider {
    async fn get_category_data(&self, category: &str) -> DataResult<CategorySnapshot> {
        self.check_available()?;
        Ok(self
            .categories
            .lock()
            .unwrap()
            .get(category)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_removed_repositories(&self) -> DataResult<Vec<String>> {
        self.check_available()?;
        Ok(self.removed.lock().unwrap().clone())
    }
}

/// Mock quota strategy for testing
///
/// Counts waits and returns at once; gives up after `limit` waits if set.
#[derive(Default)]
pub struct MockQuotaStrategy {
    waits: AtomicU32,
    limit: Option<u32>,
}

impl MockQuotaStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn giving_up_after(limit: u32) -> Self {
        Self {
            waits: AtomicU32::new(0),
            limit: Some(limit),
        }
    }

    /// Number of waits so far
    pub fn waits(&self) -> u32 {
        self.waits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuotaStrategy for MockQuotaStrategy {
    async fn wait(&self, quota: &RateLimit, _waited: Duration) -> DataResult<Duration> {
        if let Some(limit) = self.limit {
            if self.waits() >= limit {
                return Err(DataError::QuotaExhausted { reset: quota.reset });
            }
        }
        self.waits.fetch_add(1, Ordering::SeqCst);
        Ok(Duration::ZERO)
    }
}
