use crate::category::snapshot::CategorySnapshot;
use crate::category::validate_category;
use crate::config::FailurePolicy;
use crate::core::path::{data_file, repositories_file};
use crate::core::{DataError, DataResult};
use crate::di::traits::{DataProvider, GitHubProvider};
use crate::di::ServiceContainer;
use crate::github::quota::QuotaGuard;
use crate::repository::fetcher::RepositoryFetcher;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Outcome of one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    pub category: String,
    /// Repositories the run tried to fetch
    pub total: usize,
    /// Full names fetched successfully, in order
    pub fetched: Vec<String>,
    /// Full name and error message of every skipped repository
    pub failed: Vec<(String, String)>,
    /// Full names dropped from the snapshot (removed or no longer listed)
    pub dropped: Vec<String>,
    /// Number of repositories in the written membership list
    pub members: usize,
}

impl GenerationSummary {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Builds and writes the data set of one category
///
/// Repositories are fetched one at a time in listed order. The prior
/// snapshot comes from the data host, never from the output directory, and
/// both artifacts are rewritten only once every fetch has been attempted.
pub struct CategoryDataGenerator {
    github: Arc<dyn GitHubProvider>,
    data: Arc<dyn DataProvider>,
    quota: QuotaGuard,
    reference_repository: String,
    output_dir: PathBuf,
    failure_policy: FailurePolicy,
}

impl CategoryDataGenerator {
    pub fn new(container: &ServiceContainer) -> Self {
        let config = container.config();
        Self {
            github: container.github.clone(),
            data: container.data.clone(),
            quota: container.quota_guard(),
            reference_repository: config.reference_repository().to_string(),
            output_dir: config.output_dir(),
            failure_policy: config.failure_policy(),
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Generate `data.json` and `repositories.json` for `category`
    ///
    /// With `single_repository`, only that repository is fetched and merged
    /// into the published snapshot. Otherwise every repository listed for
    /// the category in the reference repository is fetched, and records no
    /// longer listed are dropped.
    pub async fn generate(
        &self,
        category: &str,
        single_repository: Option<&str>,
    ) -> DataResult<GenerationSummary> {
        validate_category(category)?;
        info!(
            "Generating {} data{}",
            category,
            single_repository
                .map(|r| format!(" for {}", r))
                .unwrap_or_default()
        );

        self.quota.ensure().await?;

        let mut snapshot = self.data.get_category_data(category).await?;
        let removed: HashSet<String> = self
            .data
            .get_removed_repositories()
            .await?
            .into_iter()
            .map(|name| name.to_lowercase())
            .collect();
        info!(
            "Loaded {} published {} records, {} removed repositories",
            snapshot.len(),
            category,
            removed.len()
        );

        let listed = match single_repository {
            Some(full_name) => vec![full_name.to_string()],
            None => self.category_list(category).await?,
        };
        let targets = select_targets(listed, &removed);

        let mut summary = GenerationSummary {
            category: category.to_string(),
            total: targets.len(),
            ..Default::default()
        };

        // Refreshed ids survive pruning even if GitHub reports a new name
        let mut refreshed: HashSet<String> = HashSet::new();
        let fetcher =
            RepositoryFetcher::new(self.github.clone(), self.quota.clone()).for_category(category);
        for (index, full_name) in targets.iter().enumerate() {
            info!("[{}/{}] {}", index + 1, targets.len(), full_name);
            match fetcher.fetch(full_name).await {
                Ok(fetched) => {
                    refreshed.insert(fetched.id.clone());
                    snapshot.upsert(fetched.id, fetched.record);
                    summary.fetched.push(full_name.clone());
                }
                Err(e) if e.is_quota_exhausted() => return Err(e),
                Err(e) => match self.failure_policy {
                    FailurePolicy::Abort => return Err(e),
                    FailurePolicy::Skip => {
                        error!("Skipping {}: {}", full_name, e);
                        summary.failed.push((full_name.clone(), e.to_string()));
                    }
                },
            }
        }

        if single_repository.is_none() {
            let listed: HashSet<String> = targets.iter().map(|t| t.to_lowercase()).collect();
            summary.dropped.extend(
                snapshot.retain(|id, key| refreshed.contains(id) || listed.contains(key)),
            );
        }
        summary.dropped.extend(snapshot.purge(&removed));
        for name in &summary.dropped {
            info!("Dropped {} from {}", name, category);
        }

        summary.members = self.write(category, &snapshot)?;

        info!(
            "{}: {} fetched, {} failed, {} members written to {}",
            category,
            summary.fetched.len(),
            summary.failed.len(),
            summary.members,
            self.output_dir.join(category).display()
        );
        Ok(summary)
    }

    /// Full names listed for `category` in the reference repository
    async fn category_list(&self, category: &str) -> DataResult<Vec<String>> {
        let github = &self.github;
        let reference = self.reference_repository.as_str();
        let content = self
            .quota
            .retry(|| github.get_file_content(reference, category))
            .await?;

        serde_json::from_str(&content).map_err(|e| {
            DataError::Decode(format!(
                "Invalid {} list in {}: {}",
                category, reference, e
            ))
        })
    }

    /// Write both artifacts; returns the membership size
    ///
    /// Neither file is replaced until both have been written in full.
    fn write(&self, category: &str, snapshot: &CategorySnapshot) -> DataResult<usize> {
        let membership = snapshot.membership();
        let data = snapshot.stage(&data_file(&self.output_dir, category))?;
        let repositories = membership.stage(&repositories_file(&self.output_dir, category))?;
        data.commit()?;
        repositories.commit()?;
        Ok(membership.len())
    }
}

/// Drop removed repositories and duplicates, keeping listed order
fn select_targets(listed: Vec<String>, removed: &HashSet<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    listed
        .into_iter()
        .filter(|name| {
            let key = name.to_lowercase();
            if removed.contains(&key) {
                warn!("{} is in the removed list, skipping", name);
                return false;
            }
            seen.insert(key)
        })
        .collect()
}
