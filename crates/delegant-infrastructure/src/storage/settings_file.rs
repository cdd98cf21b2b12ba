//! Atomic TOML document storage for the settings file.
//!
//! The file is a TOML document whose top-level tables are named records
//! (currently only `[settings]`). Records are exchanged as
//! `serde_json::Value` so the repository layer can hand them to the
//! migrator without knowing TOML specifics.
//!
//! Guarantees:
//! - **Atomicity**: writes go to a sibling tmp file, are fsynced, then renamed
//! - **Isolation**: read-modify-write runs under an exclusive `fs2` lock
//! - **Consistency**: TOML syntax is validated on every load and save

use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use delegant_core::error::{DelegantError, Result};
use serde_json::{Map, Value as JsonValue};

/// Handle to one TOML document on disk.
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the whole document.
    ///
    /// Returns `Ok(None)` when the file is missing or blank.
    pub fn load(&self) -> Result<Option<JsonValue>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let toml_value: toml::Value = toml::from_str(&content)?;
        Ok(Some(toml_to_json(toml_value)?))
    }

    /// Loads one named record.
    pub fn load_record(&self, name: &str) -> Result<Option<JsonValue>> {
        Ok(self.load()?.and_then(|doc| doc.get(name).cloned()))
    }

    /// Replaces the whole document atomically.
    pub fn save(&self, document: &JsonValue) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let toml_value = json_to_toml(document)?;
        let toml_string = toml::to_string_pretty(&toml_value)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(toml_string.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Read-modify-write under an exclusive lock.
    ///
    /// `f` receives the current document (an empty table when the file does
    /// not exist yet); its changes are written back only if it returns `Ok`.
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut JsonValue) -> Result<()>,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut document = self
            .load()?
            .unwrap_or_else(|| JsonValue::Object(Map::new()));
        f(&mut document)?;
        self.save(&document)
    }

    /// Replaces one named record, keeping every other table intact.
    pub fn save_record(&self, name: &str, record: JsonValue) -> Result<()> {
        self.update(|document| {
            let table = document.as_object_mut().ok_or_else(|| {
                DelegantError::Serialization {
                    format: "TOML".to_string(),
                    message: format!("'{}' is not a table document", self.path.display()),
                }
            })?;
            table.insert(name.to_string(), record);
            Ok(())
        })
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| DelegantError::io("Path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| DelegantError::io("Path has no file name"))?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// Exclusive lock guard; the lock file is removed on drop.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        use fs2::FileExt;
        file.lock_exclusive()
            .map_err(|e| DelegantError::io(format!("Failed to acquire lock: {}", e)))?;

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn toml_to_json(toml_value: toml::Value) -> Result<JsonValue> {
    let json_str = serde_json::to_string(&toml_value)?;
    Ok(serde_json::from_str(&json_str)?)
}

fn json_to_toml(json_value: &JsonValue) -> Result<toml::Value> {
    let json_str = serde_json::to_string(json_value)?;
    Ok(serde_json::from_str(&json_str)?)
}
