//! Integration tests
//!
//! Drive the generator against a wiremock server standing in for both the
//! GitHub API and the data host, and the binary through assert_cmd.

#[path = "integration/common.rs"]
mod common;

#[path = "integration/cli.rs"]
mod cli;
#[path = "integration/generate.rs"]
mod generate;
