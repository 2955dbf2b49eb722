//! GitHub API type definitions

use serde::{Deserialize, Serialize};

fn default_branch() -> String {
    "main".to_string()
}

/// GitHub repository information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub id: u64,
    pub full_name: String,
    #[serde(default = "default_branch")]
    pub default_branch: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Branch information (only the head commit is used)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubBranch {
    #[serde(default)]
    pub name: Option<String>,
    pub commit: BranchCommit,
}

/// Head commit of a branch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchCommit {
    pub sha: String,
}

/// Kind of a tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeEntryType {
    Blob,
    Tree,
    Commit,
}

/// One entry of a git tree listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: TreeEntryType,
}

impl TreeEntry {
    pub fn is_file(&self) -> bool {
        self.entry_type == TreeEntryType::Blob
    }

    /// Last path component
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Git tree listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubTree {
    #[serde(default)]
    pub tree: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

impl GitHubTree {
    /// Whether a file exists at exactly `path`
    pub fn contains_file(&self, path: &str) -> bool {
        self.tree.iter().any(|e| e.is_file() && e.path == path)
    }

    pub fn files(&self) -> impl Iterator<Item = &TreeEntry> {
        self.tree.iter().filter(|e| e.is_file())
    }
}

/// GitHub release information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// Raw response of the contents endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ContentResponse {
    pub content: String,
    #[serde(default)]
    pub encoding: Option<String>,
}

/// GitHub API rate limit information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub remaining: u64,
    #[serde(default)]
    pub reset: u64,
}

impl RateLimit {
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// Body of `/rate_limit`
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitResponse {
    pub resources: RateLimitResources,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitResources {
    pub core: RateLimit,
}
