//! GitHub integration
//!
//! This module provides functionality for interacting with GitHub to:
//! - Read repository metadata, branches, trees and releases
//! - Retrieve decoded file contents
//! - Track and wait out the API quota

pub mod client;
pub mod quota;
pub mod types;

pub use client::GitHubClient;
pub use quota::{NoWait, QuotaGuard, WaitUntilReset};
pub use types::{GitHubBranch, GitHubRelease, GitHubRepo, GitHubTree, RateLimit, TreeEntry};
