//! Service container for dependency injection

use super::traits::{ConfigProvider, DataProvider, GitHubProvider, QuotaStrategy};
use crate::category::generator::CategoryDataGenerator;
use crate::config::Config;
use crate::core::DataResult;
use crate::github::client::GitHubClient;
use crate::github::quota::{QuotaGuard, WaitUntilReset};
use crate::remote::DataClient;
use std::sync::Arc;

/// Service container for dependency injection
///
/// Holds every service the generator needs as a trait object, so tests can
/// swap any of them for a mock.
#[derive(Clone)]
pub struct ServiceContainer {
    pub config: Arc<dyn ConfigProvider>,
    pub github: Arc<dyn GitHubProvider>,
    pub data: Arc<dyn DataProvider>,
    pub quota_strategy: Arc<dyn QuotaStrategy>,
}

impl ServiceContainer {
    /// Create a new service container with production implementations
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built (e.g. the token is
    /// not a valid header value).
    pub fn new(config: Config) -> DataResult<Self> {
        let github = GitHubClient::new(&config)?;
        let data = DataClient::new(&config)?;
        let quota_strategy = WaitUntilReset::new(config.quota_max_wait());

        Ok(Self {
            config: Arc::new(config),
            github: Arc::new(github),
            data: Arc::new(data),
            quota_strategy: Arc::new(quota_strategy),
        })
    }

    /// Create a service container with custom provider implementations
    pub fn with_providers(
        config: Arc<dyn ConfigProvider>,
        github: Arc<dyn GitHubProvider>,
        data: Arc<dyn DataProvider>,
        quota_strategy: Arc<dyn QuotaStrategy>,
    ) -> Self {
        Self {
            config,
            github,
            data,
            quota_strategy,
        }
    }

    /// Get the config provider
    pub fn config(&self) -> &dyn ConfigProvider {
        self.config.as_ref()
    }

    /// Quota guard over this container's GitHub provider and strategy
    pub fn quota_guard(&self) -> QuotaGuard {
        QuotaGuard::new(self.github.clone(), self.quota_strategy.clone())
    }

    /// Generator configured from this container
    pub fn generator(&self) -> CategoryDataGenerator {
        CategoryDataGenerator::new(self)
    }
}
