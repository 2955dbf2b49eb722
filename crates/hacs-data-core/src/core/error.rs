use thiserror::Error;

pub type DataResult<T> = Result<T, DataError>;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream answered with a non-2xx status.
    #[error("Network error: {0}")]
    Network(String),

    /// Malformed base64, UTF-8 or JSON content, or an unusable value.
    #[error("Decode error: {0}")]
    Decode(String),

    /// API quota is used up until `reset` (unix seconds).
    #[error("API rate limit exhausted (resets at {reset})")]
    QuotaExhausted { reset: u64 },

    #[error("Manifest missing: {0}")]
    ManifestMissing(String),

    #[error("Failed to fetch {repository}: {source}")]
    Fetch {
        repository: String,
        #[source]
        source: Box<DataError>,
    },

    #[error("Path error: {0}")]
    Path(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DataError {
    /// Wrap an error raised while fetching `repository`.
    pub fn fetch(repository: impl Into<String>, source: DataError) -> Self {
        DataError::Fetch {
            repository: repository.into(),
            source: Box::new(source),
        }
    }

    /// True when this error (or the error it wraps) is a quota exhaustion.
    pub fn is_quota_exhausted(&self) -> bool {
        match self {
            DataError::QuotaExhausted { .. } => true,
            DataError::Fetch { source, .. } => source.is_quota_exhausted(),
            _ => false,
        }
    }

    /// The innermost error, skipping `Fetch` wrappers.
    pub fn root(&self) -> &DataError {
        match self {
            DataError::Fetch { source, .. } => source.root(),
            other => other,
        }
    }
}
