//! Repository trait for settings persistence.

use async_trait::async_trait;

use super::model::Settings;
use crate::error::Result;

/// Persistent key-value store holding the saved settings record.
///
/// Implementations are free to choose the on-disk format; callers only rely on
/// load-after-save returning an equal record.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Loads the saved record.
    ///
    /// Returns `Ok(None)` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<Settings>>;

    /// Replaces the saved record.
    async fn save(&self, settings: &Settings) -> Result<()>;
}
