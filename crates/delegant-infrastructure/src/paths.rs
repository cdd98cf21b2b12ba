//! Path management for Delegant configuration files.
//!
//! Paths are resolved via `AppPaths` from the version-migrate crate so the
//! layout follows platform conventions (XDG on Linux, Application Support on
//! macOS, AppData on Windows).
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/delegant/          # Config directory (or $DELEGANT_HOME)
//! ├── settings.toml            # [settings] record, versioned
//! └── logs/                    # Daily rolling log files
//!     └── delegant.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

use delegant_core::error::{DelegantError, Result};
use version_migrate::AppPaths;

/// Environment variable that overrides the config directory.
pub const HOME_ENV: &str = "DELEGANT_HOME";

const APP_NAME: &str = "delegant";
const SETTINGS_FILE: &str = "settings.toml";
const LOGS_DIR: &str = "logs";

/// Resolves every on-disk location used by the app.
///
/// An explicit base directory wins over `DELEGANT_HOME`, which wins over the
/// platform default.
#[derive(Debug, Clone, Default)]
pub struct DelegantPaths {
    base: Option<PathBuf>,
}

impl DelegantPaths {
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    /// Root configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }

        if let Some(home) = std::env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
            return Ok(PathBuf::from(home));
        }

        AppPaths::new(APP_NAME)
            .config_dir()
            .map_err(|e| DelegantError::config(format!("Cannot resolve config directory: {}", e)))
    }

    /// Path of the persisted settings file.
    pub fn settings_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join(SETTINGS_FILE))
    }

    /// Directory for rolling log files.
    pub fn logs_dir(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join(LOGS_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_base_wins() {
        let paths = DelegantPaths::new(Some(PathBuf::from("/tmp/delegant-test")));
        assert_eq!(
            paths.settings_file().unwrap(),
            PathBuf::from("/tmp/delegant-test/settings.toml")
        );
        assert_eq!(
            paths.logs_dir().unwrap(),
            PathBuf::from("/tmp/delegant-test/logs")
        );
    }
}
