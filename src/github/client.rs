//! GitHub API client implementation

use crate::core::{DataError, DataResult};
use crate::di::traits::{ConfigProvider, GitHubProvider};
use crate::github::types::{
    ContentResponse, GitHubBranch, GitHubRelease, GitHubRepo, GitHubTree, RateLimit,
    RateLimitResponse,
};
use async_trait::async_trait;
use base64::Engine;
use reqwest::{header, Client as HttpClient, StatusCode};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::debug;

/// GitHub API client
pub struct GitHubClient {
    http_client: HttpClient,
    api_url: String,
    rate_limiter: RateLimiter,
}

/// Last quota seen in response headers
#[derive(Default)]
struct RateLimiter {
    last: Mutex<Option<RateLimit>>,
}

/// Percent-encode each segment of a slash separated path
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn header_u64(response: &reqwest::Response, name: &str) -> Option<u64> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
}

/// Decode the body of a contents response
pub fn decode_content(response: ContentResponse) -> DataResult<String> {
    if let Some(encoding) = response.encoding.as_deref() {
        if encoding != "base64" {
            return Err(DataError::Decode(format!("Unexpected encoding: {}", encoding)));
        }
    }

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(response.content.replace('\n', ""))
        .map_err(|e| DataError::Decode(format!("Failed to decode base64 content: {}", e)))?;

    String::from_utf8(decoded)
        .map_err(|e| DataError::Decode(format!("Invalid UTF-8 in file content: {}", e)))
}

impl GitHubClient {
    /// Create a new GitHub client
    pub fn new(config: &dyn ConfigProvider) -> DataResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("hacs-data-generator"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        if let Some(token) = config.token() {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("token {}", token))
                    .map_err(|e| DataError::Config(format!("Invalid GitHub token: {}", e)))?,
            );
        }

        let http_client = HttpClient::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| DataError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_url: config.api_url().trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::default(),
        })
    }

    /// Get repository information
    pub async fn get_repo(&self, full_name: &str) -> DataResult<GitHubRepo> {
        let url = format!("{}/repos/{}", self.api_url, full_name);
        self.api_get(&url).await
    }

    /// Get a branch and its head commit
    pub async fn get_branch(&self, full_name: &str, branch: &str) -> DataResult<GitHubBranch> {
        let url = format!(
            "{}/repos/{}/branches/{}",
            self.api_url,
            full_name,
            encode_path(branch)
        );
        self.api_get(&url).await
    }

    /// Get the full (recursive) file tree at a ref
    pub async fn get_tree(&self, full_name: &str, ref_: &str) -> DataResult<GitHubTree> {
        let url = format!(
            "{}/repos/{}/git/trees/{}?recursive=1",
            self.api_url,
            full_name,
            encode_path(ref_)
        );
        self.api_get(&url).await
    }

    /// Get releases for a repository
    pub async fn get_releases(&self, full_name: &str) -> DataResult<Vec<GitHubRelease>> {
        let url = format!("{}/repos/{}/releases", self.api_url, full_name);
        self.api_get(&url).await
    }

    /// Get file content from a repository
    pub async fn get_file_content(&self, full_name: &str, path: &str) -> DataResult<String> {
        let url = format!(
            "{}/repos/{}/contents/{}",
            self.api_url,
            full_name,
            encode_path(path)
        );

        // GitHub returns base64-encoded content
        let content: ContentResponse = self.api_get(&url).await?;
        decode_content(content)
    }

    /// Get the core API quota
    ///
    /// `/rate_limit` does not count against the quota, so it bypasses the
    /// local limiter.
    pub async fn get_rate_limit(&self) -> DataResult<RateLimit> {
        let url = format!("{}/rate_limit", self.api_url);
        let response = self.send(&url).await?;
        let body: RateLimitResponse = response
            .json()
            .await
            .map_err(|e| DataError::Decode(format!("Failed to parse rate limit: {}", e)))?;

        *self.rate_limiter.last.lock().await = Some(body.resources.core.clone());
        Ok(body.resources.core)
    }

    /// Send a GET request and map error statuses
    async fn send(&self, url: &str) -> DataResult<reqwest::Response> {
        debug!("GET {}", url);
        let response = self.http_client.get(url).send().await?;

        // Update rate limit from headers
        self.update_rate_limit(&response).await;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            if header_u64(&response, "x-ratelimit-remaining") == Some(0) {
                let reset = header_u64(&response, "x-ratelimit-reset").unwrap_or(0);
                return Err(DataError::QuotaExhausted { reset });
            }
        }

        Err(DataError::Network(format!("HTTP {} for {}", status, url)))
    }

    /// Make an API request and handle rate limiting
    async fn api_request(&self, url: &str) -> DataResult<reqwest::Response> {
        self.check_rate_limit().await?;
        self.send(url).await
    }

    /// Make an API GET request and parse JSON response
    async fn api_get<T: serde::de::DeserializeOwned>(&self, url: &str) -> DataResult<T> {
        let response = self.api_request(url).await?;

        response
            .json()
            .await
            .map_err(|e| DataError::Decode(format!("Failed to parse GitHub API response: {}", e)))
    }

    /// Refuse to send while the last seen quota is exhausted and not yet reset
    async fn check_rate_limit(&self) -> DataResult<()> {
        if let Some(limit) = self.rate_limiter.last.lock().await.as_ref() {
            if limit.is_exhausted() && now_secs() < limit.reset {
                return Err(DataError::QuotaExhausted { reset: limit.reset });
            }
        }
        Ok(())
    }

    /// Update rate limit from response headers
    async fn update_rate_limit(&self, response: &reqwest::Response) {
        let Some(remaining) = header_u64(response, "x-ratelimit-remaining") else {
            return;
        };

        let mut last = self.rate_limiter.last.lock().await;
        let limit = last.get_or_insert_with(RateLimit::default);
        limit.remaining = remaining;
        if let Some(reset) = header_u64(response, "x-ratelimit-reset") {
            limit.reset = reset;
        }
        if let Some(max) = header_u64(response, "x-ratelimit-limit") {
            limit.limit = max;
        }
    }
}

// Implement GitHubProvider trait
#[async_trait]
impl GitHubProvider for GitHubClient {
    async fn get_repo(&self, full_name: &str) -> DataResult<GitHubRepo> {
        Self::get_repo(self, full_name).await
    }

    async fn get_branch(&self, full_name: &str, branch: &str) -> DataResult<GitHubBranch> {
        Self::get_branch(self, full_name, branch).await
    }

    async fn get_tree(&self, full_name: &str, ref_: &str) -> DataResult<GitHubTree> {
        Self::get_tree(self, full_name, ref_).await
    }

    async fn get_releases(&self, full_name: &str) -> DataResult<Vec<GitHubRelease>> {
        Self::get_releases(self, full_name).await
    }

    async fn get_file_content(&self, full_name: &str, path: &str) -> DataResult<String> {
        Self::get_file_content(self, full_name, path).await
    }

    async fn get_rate_limit(&self) -> DataResult<RateLimit> {
        Self::get_rate_limit(self).await
    }
}
