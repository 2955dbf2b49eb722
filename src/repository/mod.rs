//! Per-repository metadata
//!
//! The fetcher walks a repository through the GitHub API and turns what it
//! finds into the record stored in a category snapshot.

pub mod fetcher;
pub mod manifest;
pub mod record;

pub use fetcher::{FetchedRepository, RepositoryFetcher};
pub use manifest::{HacsManifest, MANIFEST_FILE};
pub use record::RepositoryRecord;
