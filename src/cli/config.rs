use hacs_data::config::Config;
use hacs_data::core::{DataError, DataResult};
use std::path::Path;

/// Load the config from `path`, or from the user config directory
pub fn load(path: Option<&Path>) -> DataResult<Config> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(DataError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Ok(Config::load_from(path)?.with_env_overrides())
        }
        None => Config::load(),
    }
}

pub fn show(config: &Config) -> DataResult<()> {
    print!("{}", render(config)?);
    Ok(())
}

/// Effective config as YAML, token masked
fn render(config: &Config) -> DataResult<String> {
    let mut shown = config.clone();
    if shown.token.is_some() {
        shown.token = Some("********".to_string());
    }
    serde_yaml::to_string(&shown)
        .map_err(|e| DataError::Config(format!("Failed to serialize config: {}", e)))
}
