//! Named, reusable analysis requests stored in a JSON file.
//!
//! The whole file is read, modified and rewritten on every save. Concurrent
//! writers are not coordinated; the last writer wins.
//!
//! # Security
//! Passwords are never written: [`Credentials`](crate::security::Credentials)
//! skips the password when serialized. A preset run needs the password
//! supplied again.

use crate::error::PatternAnalyzerError;
use crate::models::AnalysisRequest;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name used when no preset path is configured.
pub const DEFAULT_PRESET_FILE: &str = "presets.json";

/// A saved analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    /// Unique, trimmed preset name
    pub name: String,
    /// Saved request; its password is never stored
    pub request: AnalysisRequest,
    /// When the preset was last saved
    pub saved_at: DateTime<Utc>,
}

/// Reads and writes presets at one path.
#[derive(Debug, Clone)]
pub struct PresetStore {
    path: PathBuf,
}

impl Default for PresetStore {
    fn default() -> Self {
        Self::new(DEFAULT_PRESET_FILE)
    }
}

impl PresetStore {
    /// Creates a store backed by `path`. Nothing is read until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every preset.
    ///
    /// A missing file is an empty store. A file that cannot be parsed is
    /// logged and also treated as empty.
    ///
    /// # Errors
    /// Returns an I/O error only when an existing file cannot be read
    pub async fn load(&self) -> Result<Vec<Preset>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Preset file not found");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(PatternAnalyzerError::Io {
                    context: format!("Failed to read {}", self.path.display()),
                    source: e,
                });
            }
        };

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str(&contents) {
            Ok(presets) => Ok(presets),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Preset file is corrupt, ignoring it"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Presets sorted by name.
    ///
    /// # Errors
    /// Same as [`PresetStore::load`]
    pub async fn list(&self) -> Result<Vec<Preset>> {
        let mut presets = self.load().await?;
        presets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(presets)
    }

    /// Looks up one preset by name.
    ///
    /// # Errors
    /// Same as [`PresetStore::load`]
    pub async fn get(&self, name: &str) -> Result<Option<Preset>> {
        let name = name.trim();
        Ok(self.load().await?.into_iter().find(|p| p.name == name))
    }

    /// Saves `request` under `name`, replacing any preset with that name.
    ///
    /// # Errors
    /// Returns a configuration error for a blank name, or an I/O or
    /// serialization error if the file cannot be written
    pub async fn save(&self, name: &str, request: &AnalysisRequest) -> Result<Preset> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PatternAnalyzerError::configuration(
                "preset name cannot be empty",
            ));
        }

        let preset = Preset {
            name: name.to_string(),
            request: request.clone(),
            saved_at: Utc::now(),
        };

        let mut presets = self.load().await?;
        match presets.iter_mut().find(|p| p.name == name) {
            Some(existing) => *existing = preset.clone(),
            None => presets.push(preset.clone()),
        }
        self.write_all(&presets).await?;

        tracing::info!(preset = name, path = %self.path.display(), "Saved preset");
        Ok(preset)
    }

    /// Removes the preset called `name`.
    ///
    /// Returns whether a preset was removed; the file is left untouched
    /// otherwise.
    ///
    /// # Errors
    /// Returns an I/O or serialization error if the file cannot be written
    pub async fn delete(&self, name: &str) -> Result<bool> {
        let name = name.trim();
        let mut presets = self.load().await?;
        let before = presets.len();
        presets.retain(|p| p.name != name);

        if presets.len() == before {
            return Ok(false);
        }

        self.write_all(&presets).await?;
        tracing::info!(preset = name, "Deleted preset");
        Ok(true)
    }

    /// Writes to a sibling temp file and renames it over the target.
    async fn write_all(&self, presets: &[Preset]) -> Result<()> {
        let json_data =
            serde_json::to_string_pretty(presets).map_err(|e| PatternAnalyzerError::Serialization {
                context: "Failed to serialize presets".to_string(),
                source: e,
            })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PatternAnalyzerError::Io {
                    context: format!("Failed to create {}", parent.display()),
                    source: e,
                })?;
        }

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, json_data)
            .await
            .map_err(|e| PatternAnalyzerError::Io {
                context: format!("Failed to write to {}", temp_path.display()),
                source: e,
            })?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| PatternAnalyzerError::Io {
                context: format!("Failed to replace {}", self.path.display()),
                source: e,
            })
    }

    fn temp_path(&self) -> PathBuf {
        let mut file_name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_else(|| DEFAULT_PRESET_FILE.into());
        file_name.push(".tmp");
        self.path.with_file_name(file_name)
    }
}
