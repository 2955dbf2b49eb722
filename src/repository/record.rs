use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Length of the abbreviated commit stored in `last_commit`
pub const SHORT_SHA_LEN: usize = 7;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Published metadata of one repository, as stored in `data.json`
///
/// Fields this tool does not know about (left by older generators) are kept
/// in `extra` so that records which are not refreshed survive unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub manifest: Map<String, Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    pub full_name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub last_commit: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub stargazers_count: u64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub topics: Vec<String>,

    /// Unix timestamp (seconds) of the fetch that produced this record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_fetched: Option<f64>,

    /// Tag of the newest published release
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_version: Option<String>,

    /// Integration domain from `custom_components/<domain>/manifest.json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RepositoryRecord {
    /// Lowercased full name, used for membership comparisons
    pub fn key(&self) -> String {
        self.full_name.to_lowercase()
    }
}

/// Abbreviate a commit SHA to its first seven characters
pub fn short_sha(sha: &str) -> Option<String> {
    let short: String = sha.chars().take(SHORT_SHA_LEN).collect();
    (short.chars().count() == SHORT_SHA_LEN).then_some(short)
}
