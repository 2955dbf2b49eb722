//! `hacs.json` repository manifest

use crate::core::{DataError, DataResult};
use serde_json::{Map, Value};

/// File every repository must carry at its root
pub const MANIFEST_FILE: &str = "hacs.json";

/// Manifest keys copied into the published record
const EXPORTED_KEYS: &[&str] = &[
    "name",
    "content_in_root",
    "country",
    "hacs",
    "hide_default_branch",
    "homeassistant",
    "persistent_directory",
    "render_readme",
    "zip_release",
];

/// Parsed `hacs.json`
#[derive(Debug, Clone, PartialEq)]
pub struct HacsManifest {
    /// File name override used to locate the main file in the tree
    pub filename: Option<String>,
    raw: Map<String, Value>,
}

impl HacsManifest {
    /// Parse manifest JSON; it must be an object with a string `name`
    pub fn parse(content: &str) -> DataResult<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| DataError::Decode(format!("Invalid {}: {}", MANIFEST_FILE, e)))?;

        let Value::Object(raw) = value else {
            return Err(DataError::Decode(format!(
                "{} must be a JSON object",
                MANIFEST_FILE
            )));
        };

        let has_name = raw
            .get("name")
            .and_then(Value::as_str)
            .is_some_and(|n| !n.is_empty());
        if !has_name {
            return Err(DataError::Decode(format!("{} has no name", MANIFEST_FILE)));
        }

        let filename = raw
            .get("filename")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self { filename, raw })
    }

    /// The subset of keys stored in `data.json`
    pub fn exported(&self) -> Map<String, Value> {
        self.raw
            .iter()
            .filter(|(key, _)| EXPORTED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}
