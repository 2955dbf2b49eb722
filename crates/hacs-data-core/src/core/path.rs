use crate::core::error::{DataError, DataResult};
use std::path::{Path, PathBuf};

/// Get the hacs-data config directory
///
/// Platform-specific locations:
/// - Windows: %APPDATA%\hacs-data
/// - Linux: ~/.config/hacs-data
/// - macOS: ~/Library/Application Support/hacs-data
pub fn data_home() -> DataResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| DataError::Path("Could not determine config directory".to_string()))?;
    Ok(config_dir.join("hacs-data"))
}

/// Get the config file path
pub fn config_file() -> DataResult<PathBuf> {
    Ok(data_home()?.join("config.yaml"))
}

/// Directory holding the artifacts of one category (`{output}/{category}`)
pub fn category_dir(output_dir: &Path, category: &str) -> PathBuf {
    output_dir.join(category)
}

/// Path of the category snapshot (`{output}/{category}/data.json`)
pub fn data_file(output_dir: &Path, category: &str) -> PathBuf {
    category_dir(output_dir, category).join("data.json")
}

/// Path of the membership list (`{output}/{category}/repositories.json`)
pub fn repositories_file(output_dir: &Path, category: &str) -> PathBuf {
    category_dir(output_dir, category).join("repositories.json")
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> DataResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// A file written next to its target, not yet moved into place
///
/// Committing renames it over the target, so readers never observe a
/// half-written artifact.
///
/// Dropping it without calling [`StagedFile::commit`] removes the temp file.
#[derive(Debug)]
pub struct StagedFile {
    tmp: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedFile {
    /// Write `contents` to a hidden sibling of `path` (`.{name}.tmp`)
    pub fn write(path: &Path, contents: &[u8]) -> DataResult<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| DataError::Path(format!("No parent directory for {}", path.display())))?;
        ensure_dir(parent)?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DataError::Path(format!("Invalid file name: {}", path.display())))?;
        let tmp = parent.join(format!(".{}.tmp", file_name));

        std::fs::write(&tmp, contents)?;
        Ok(Self {
            tmp,
            target: path.to_path_buf(),
            committed: false,
        })
    }

    /// Rename the temp file over the target
    pub fn commit(mut self) -> DataResult<()> {
        std::fs::rename(&self.tmp, &self.target)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.tmp);
        }
    }
}
