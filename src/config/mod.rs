use crate::core::path::{config_file, ensure_dir};
use crate::core::{DataError, DataResult};
use crate::di::ConfigProvider;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the configured token
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Environment variable overriding the configured output directory
pub const OUTPUT_DIR_ENV: &str = "DATA_GENERATOR_OUTPUT_DIR";

/// What the generator does when a single repository fails to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure, keep any stale record and continue
    #[default]
    Skip,
    /// Stop the run and write nothing
    Abort,
}

/// Quota waiting settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Longest total wait for a quota reset before giving up
    #[serde(default = "default_quota_max_wait_secs")]
    pub max_wait_secs: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_wait_secs: default_quota_max_wait_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// GitHub REST API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Host publishing the current data set (prior snapshots, removed list)
    #[serde(default = "default_data_url")]
    pub data_url: String,

    /// Repository holding one repository list per category
    #[serde(default = "default_reference_repository")]
    pub reference_repository: String,

    /// Directory the `{category}/data.json` and `{category}/repositories.json`
    /// artifacts are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// GitHub token (GITHUB_TOKEN takes precedence)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Behaviour when one repository fails to fetch
    /// - "skip": keep going, stale data is kept (default)
    /// - "abort": stop the run without writing anything
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    #[serde(default)]
    pub quota: QuotaConfig,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_data_url() -> String {
    "https://data-v2.hacs.xyz".to_string()
}

fn default_reference_repository() -> String {
    "hacs/default".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputdata")
}

fn default_quota_max_wait_secs() -> u64 {
    3600
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            data_url: default_data_url(),
            reference_repository: default_reference_repository(),
            output_dir: default_output_dir(),
            token: None,
            failure_policy: FailurePolicy::default(),
            quota: QuotaConfig::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    /// Load config from the platform-specific config directory, creating a
    /// default one if it doesn't exist, then apply environment overrides.
    ///
    /// Config locations:
    /// - Windows: %APPDATA%\hacs-data\config.yaml
    /// - Linux: ~/.config/hacs-data/config.yaml
    /// - macOS: ~/Library/Application Support/hacs-data/config.yaml
    pub fn load() -> DataResult<Self> {
        let config_path = config_file()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config.with_env_overrides());
        }

        Ok(Self::load_from(&config_path)?.with_env_overrides())
    }

    /// Load config from an explicit file, without environment overrides
    pub fn load_from(path: &Path) -> DataResult<Self> {
        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| DataError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save config to an explicit file
    pub fn save_to(&self, path: &Path) -> DataResult<()> {
        let config_dir = path
            .parent()
            .ok_or_else(|| DataError::Path("Invalid config path".to_string()))?;
        ensure_dir(config_dir)?;

        let content = serde_yaml::to_string(self)
            .map_err(|e| DataError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)?;
        Ok(())
    }

    /// Apply GITHUB_TOKEN and DATA_GENERATOR_OUTPUT_DIR
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(token) = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()) {
            self.token = Some(token);
        }
        if let Some(dir) = std::env::var(OUTPUT_DIR_ENV).ok().filter(|d| !d.is_empty()) {
            self.output_dir = PathBuf::from(dir);
        }
        self
    }
}

// Implement ConfigProvider trait
impl ConfigProvider for Config {
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
        Duration::from_secs(self.quota.max_wait_secs)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
