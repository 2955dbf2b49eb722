//! Dependency injection infrastructure for hacs-data
//!
//! Services are held as trait objects so the generator can run against the
//! real GitHub API and data host, or against in-memory mocks in tests.
//!
//! # Example (Production)
//! ```no_run
//! use hacs_data::config::Config;
//! use hacs_data::di::ServiceContainer;
//!
//! # fn example() -> hacs_data::core::DataResult<()> {
//! let container = ServiceContainer::new(Config::load()?)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example (Testing)
//! ```
//! use hacs_data::di::{ServiceContainer, mocks::*};
//! use std::sync::Arc;
//!
//! let container = ServiceContainer::with_providers(
//!     Arc::new(MockConfigProvider::default()),
//!     Arc::new(MockGitHubProvider::new()),
//!     Arc::new(MockDataProvider::new()),
//!     Arc::new(MockQuotaStrategy::new()),
//! );
//! ```

pub mod container;
pub mod mocks;
pub mod traits;

// Re-export key types
pub use container::ServiceContainer;
pub use traits::{ConfigProvider, DataProvider, GitHubProvider, QuotaStrategy};
