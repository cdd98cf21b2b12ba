//! TOML-backed settings repository.
//!
//! Stores the settings as the `[settings]` table of `settings.toml`, stamped
//! with a schema version and migrated on load via version-migrate.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use version_migrate::Migrator;

use delegant_core::error::{DelegantError, Result};
use delegant_core::settings::{Settings, SettingsRepository};

use crate::dto::{CURRENT_SETTINGS_VERSION, SETTINGS_ENTITY, create_settings_migrator};
use crate::paths::DelegantPaths;
use crate::storage::SettingsFile;

/// File-based settings repository with version migration support.
pub struct TomlSettingsRepository {
    file: SettingsFile,
    migrator: Migrator,
}

impl TomlSettingsRepository {
    /// Creates a repository at the default settings location.
    pub fn new(paths: &DelegantPaths) -> Result<Self> {
        Self::with_path(paths.settings_file()?)
    }

    /// Creates a repository backed by an explicit file (for testing).
    pub fn with_path(path: PathBuf) -> Result<Self> {
        Ok(Self {
            file: SettingsFile::new(path),
            migrator: create_settings_migrator()?,
        })
    }

    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }
}

/// Records written before versioning carry no `version` key; they are read
/// as the current schema, whose fields all default.
fn stamp_version(mut record: JsonValue) -> Result<JsonValue> {
    let table = record
        .as_object_mut()
        .ok_or_else(|| DelegantError::Serialization {
            format: "TOML".to_string(),
            message: format!("[{}] is not a table", SETTINGS_ENTITY),
        })?;

    if !table.contains_key("version") {
        tracing::info!(
            "[SettingsRepository] Unversioned settings record, reading as {}",
            CURRENT_SETTINGS_VERSION
        );
        table.insert(
            "version".to_string(),
            JsonValue::String(CURRENT_SETTINGS_VERSION.to_string()),
        );
    }

    Ok(record)
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DelegantError::internal(format!("Settings I/O task failed: {}", e)))?
}

#[async_trait]
impl SettingsRepository for TomlSettingsRepository {
    async fn load(&self) -> Result<Option<Settings>> {
        let file = self.file.clone();
        let Some(record) = run_blocking(move || file.load_record(SETTINGS_ENTITY)).await? else {
            tracing::debug!(
                "[SettingsRepository] No saved settings at {}",
                self.file.path().display()
            );
            return Ok(None);
        };

        let record = stamp_version(record)?;
        let settings: Settings = self
            .migrator
            .load_flat_from(SETTINGS_ENTITY, record)
            .map_err(|e| DelegantError::Migration(format!("Failed to migrate settings: {}", e)))?;

        Ok(Some(settings))
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        let serialized = self
            .migrator
            .save_domain_flat(SETTINGS_ENTITY, settings.clone())
            .map_err(|e| DelegantError::Serialization {
                format: "JSON".to_string(),
                message: format!("Failed to serialize settings: {}", e),
            })?;
        let record: JsonValue = serde_json::from_str(&serialized)?;

        let file = self.file.clone();
        run_blocking(move || file.save_record(SETTINGS_ENTITY, record)).await?;

        tracing::debug!(
            "[SettingsRepository] Saved settings to {}",
            self.file.path().display()
        );
        Ok(())
    }
}
