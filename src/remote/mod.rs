//! Client for the host publishing the current data set
//!
//! Serves `{category}/data.json` (the last published snapshot) and
//! `removed/repositories.json` (repositories withdrawn from the store).

use crate::category::snapshot::CategorySnapshot;
use crate::core::{DataError, DataResult};
use crate::di::traits::{ConfigProvider, DataProvider};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// Client for the published data host
pub struct DataClient {
    client: Client,
    base_url: String,
}

impl DataClient {
    /// Create a new data host client
    pub fn new(config: &dyn ConfigProvider) -> DataResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| DataError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.data_url().trim_end_matches('/').to_string(),
        })
    }

    /// Published snapshot of `category`; empty when nothing is published yet
    pub async fn get_category_data(&self, category: &str) -> DataResult<CategorySnapshot> {
        let url = format!("{}/{}/data.json", self.base_url, urlencoding::encode(category));
        let snapshot: Option<CategorySnapshot> = self.get_optional_json(&url).await?;
        Ok(snapshot.unwrap_or_else(|| {
            info!("No published data for {}, starting empty", category);
            CategorySnapshot::default()
        }))
    }

    /// Full names of removed repositories; empty when the list is missing
    pub async fn get_removed_repositories(&self) -> DataResult<Vec<String>> {
        let url = format!("{}/removed/repositories.json", self.base_url);
        Ok(self.get_optional_json(&url).await?.unwrap_or_default())
    }

    /// GET and parse JSON, mapping 404 to `None`
    async fn get_optional_json<T: DeserializeOwned>(&self, url: &str) -> DataResult<Option<T>> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(DataError::Http)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(DataError::Network(format!(
                "HTTP {} for {}",
                response.status(),
                url
            )));
        }

        let content = response.text().await.map_err(DataError::Http)?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| DataError::Decode(format!("Invalid JSON from {}: {}", url, e)))
    }
}

// Implement DataProvider trait
#[async_trait]
impl DataProvider for DataClient {
    async fn get_category_data(&self, category: &str) -> DataResult<CategorySnapshot> {
        self.get_category_data(category).await
    }

    async fn get_removed_repositories(&self) -> DataResult<Vec<String>> {
        self.get_removed_repositories().await
    }
}
