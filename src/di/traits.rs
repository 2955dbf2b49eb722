//! Trait definitions for dependency injection

use crate::category::snapshot::CategorySnapshot;
use crate::config::FailurePolicy;
use crate::core::DataResult;
use crate::github::types::{GitHubBranch, GitHubRelease, GitHubRepo, GitHubTree, RateLimit};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// Trait for configuration access
///
/// Provides read-only access to application configuration.
/// Implementations should be thread-safe (Send + Sync).
pub trait ConfigProvider: Send + Sync {
    /// Base URL of the GitHub REST API
    fn api_url(&self) -> &str;

    /// Base URL of the host publishing the current data set
    fn data_url(&self) -> &str;

    /// Repository holding the per-category repository lists (e.g. "hacs/default")
    fn reference_repository(&self) -> &str;

    /// Directory the artifacts are written to
    fn output_dir(&self) -> PathBuf;

    /// GitHub token, if any
    fn token(&self) -> Option<&str>;

    /// What to do when one repository fails to fetch
    fn failure_policy(&self) -> FailurePolicy;

    /// Upper bound on time spent waiting for the API quota to reset
    fn quota_max_wait(&self) -> Duration;

    /// Timeout applied to every HTTP request
    fn request_timeout(&self) -> Duration;
}

/// Trait for GitHub API operations
///
/// Every method is a single read-only request. Implementations report an
/// exhausted quota as `DataError::QuotaExhausted`.
#[async_trait]
pub trait GitHubProvider: Send + Sync {
    /// Repository metadata
    async fn get_repo(&self, full_name: &str) -> DataResult<GitHubRepo>;

    /// A branch and its head commit
    async fn get_branch(&self, full_name: &str, branch: &str) -> DataResult<GitHubBranch>;

    /// File tree at a ref
    async fn get_tree(&self, full_name: &str, ref_: &str) -> DataResult<GitHubTree>;

    /// Releases, newest first
    async fn get_releases(&self, full_name: &str) -> DataResult<Vec<GitHubRelease>>;

    /// Decoded content of a file on the default branch
    async fn get_file_content(&self, full_name: &str, path: &str) -> DataResult<String>;

    /// Current core API quota
    async fn get_rate_limit(&self) -> DataResult<RateLimit>;
}

/// Trait for the host publishing the current data set
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Published snapshot of a category (empty when none exists)
    async fn get_category_data(&self, category: &str) -> DataResult<CategorySnapshot>;

    /// Full names of repositories removed from the store
    async fn get_removed_repositories(&self) -> DataResult<Vec<String>>;
}

/// Trait for reacting to an exhausted API quota
///
/// `wait` is called each time the quota is found exhausted. `waited` is the
/// time already spent waiting for the current call. Returns how long it
/// waited, or `DataError::QuotaExhausted` to give up.
#[async_trait]
pub trait QuotaStrategy: Send + Sync {
    async fn wait(&self, quota: &RateLimit, waited: Duration) -> DataResult<Duration>;
}
