//! Core utilities for hacs-data
//!
//! Holds the error type shared by the generator library and binary, and the
//! helpers that describe where configuration and output artifacts live.

pub mod core;

pub use crate::core::error::{DataError, DataResult};
pub use crate::core::error_help::{format_error_with_help, ErrorHelp};
