use crate::core::error::DataError;

/// Suggestion shown under an error when the binary exits.
pub trait ErrorHelp {
    fn help(&self) -> Option<&'static str>;
}

impl ErrorHelp for DataError {
    fn help(&self) -> Option<&'static str> {
        match self.root() {
            DataError::QuotaExhausted { .. } => {
                Some("Set GITHUB_TOKEN to raise the API limit, or retry after the reset time.")
            }
            DataError::Network(msg) if msg.contains("401") || msg.contains("403") => {
                Some("Check that GITHUB_TOKEN is valid and has read access.")
            }
            DataError::Network(msg) if msg.contains("404") => {
                Some("Check that the repository exists and is public.")
            }
            DataError::Http(_) => Some("Check your network connection and the configured api_url."),
            DataError::ManifestMissing(_) => {
                Some("The repository must have a hacs.json file at its root.")
            }
            DataError::Config(_) | DataError::Yaml(_) => {
                Some("Run `hacs-data config show` to inspect the active configuration.")
            }
            _ => None,
        }
    }
}

/// Render an error followed by its help text, if any.
pub fn format_error_with_help(error: &DataError) -> String {
    match error.help() {
        Some(help) => format!("error: {}\n  help: {}", error, help),
        None => format!("error: {}", error),
    }
}
