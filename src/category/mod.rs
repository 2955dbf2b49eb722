//! Category data generation
//!
//! A category is one kind of store content (integrations, themes, ...).
//! Each one is published as a snapshot of repository records (`data.json`)
//! and the sorted list of their full names (`repositories.json`).

pub mod generator;
pub mod snapshot;

pub use generator::{CategoryDataGenerator, GenerationSummary};
pub use snapshot::{CategorySnapshot, MembershipList};

use crate::core::{DataError, DataResult};

/// Categories with a repository list in the reference repository
pub const CATEGORIES: &[&str] = &[
    "appdaemon",
    "integration",
    "netdaemon",
    "plugin",
    "python_script",
    "template",
    "theme",
];

/// Reject names that are not a known category
pub fn validate_category(category: &str) -> DataResult<()> {
    if CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(DataError::Config(format!(
            "Unknown category '{}' (expected one of: {})",
            category,
            CATEGORIES.join(", ")
        )))
    }
}
