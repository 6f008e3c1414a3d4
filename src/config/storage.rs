//! Persistence for settings as TOML.

use super::{Settings, SettingsSource};
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name for branchflow under the user config dir.
const APP_DIR: &str = "branchflow";

/// Filename for settings.
const CONFIG_FILE: &str = "config.toml";

/// Default settings location: `<config dir>/branchflow/config.toml`.
///
/// Falls back to the current directory if the platform has no config dir.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}

/// Settings stored in a TOML file.
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
}

impl FileSettings {
    /// Settings at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Settings at [`default_config_path`].
    pub fn at_default_location() -> Self {
        Self::new(default_config_path())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write settings to disk.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        // Never persist something load() would reject
        settings.validate()?;

        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| {
                    Error::Config(format!("failed to create {}: {e}", dir.display()))
                })?;
            }
        }

        let content = toml::to_string_pretty(settings)
            .map_err(|e| Error::Config(format!("failed to serialize settings: {e}")))?;

        // Add header comment
        let content_with_header = format!(
            "# branchflow settings\n# Edited by `branchflow targets` / `branchflow prefixes`\n\n{content}"
        );

        fs::write(&self.path, content_with_header)
            .map_err(|e| Error::Config(format!("failed to write {}: {e}", self.path.display())))?;

        Ok(())
    }
}

impl SettingsSource for FileSettings {
    /// Load settings from disk.
    ///
    /// Returns defaults if the file doesn't exist.
    fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", self.path.display())))?;

        let settings: Settings = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", self.path.display())))?;

        settings.validate()?;
        Ok(settings)
    }
}
