//! HACS data generator
//!
//! Builds the per-category data set of the HACS store: it reads the
//! repository list of a category from the reference repository, fetches
//! every repository's metadata from GitHub, merges it with the currently
//! published snapshot and writes `data.json` and `repositories.json`.

pub use hacs_data_core::{format_error_with_help, DataError, DataResult, ErrorHelp};

/// Core module re-exported from hacs-data-core.
pub mod core {
    pub use hacs_data_core::core::*;
    pub use hacs_data_core::*;

    /// Path module re-exported from hacs-data-core.
    pub mod path {
        pub use hacs_data_core::core::path::*;
    }
}

/// Configuration management.
pub mod config;

/// GitHub API client and quota handling.
pub mod github;

/// Client for the published data host.
pub mod remote;

/// Dependency injection infrastructure.
pub mod di;

/// Repository fetching and records.
pub mod repository;

/// Category snapshots and generation.
pub mod category;
