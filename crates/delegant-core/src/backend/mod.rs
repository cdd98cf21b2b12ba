//! Command interface of the agent execution engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::catalog::ModelCatalogEntry;
use crate::error::Result;
use crate::settings::Settings;

/// Screenshot captured by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureResult {
    pub base64: String,
    pub orig_width: u32,
    pub orig_height: u32,
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub scale_factor: f64,
}

/// Output of a shell command run by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// A top-level OS window known to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub handle: u64,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Commands the front-end can issue to the agent engine.
///
/// Every call is a request/response exchange; failures come back as
/// [`crate::error::DelegantError`] values, never panics.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    async fn take_screenshot(&self) -> Result<CaptureResult>;

    async fn mouse_move(&self, x: i32, y: i32) -> Result<()>;
    async fn mouse_click(&self, x: i32, y: i32, button: MouseButton) -> Result<()>;
    async fn mouse_double_click(&self, x: i32, y: i32) -> Result<()>;
    async fn mouse_scroll(&self, x: i32, y: i32, clicks: i32) -> Result<()>;
    async fn mouse_drag(&self, start_x: i32, start_y: i32, end_x: i32, end_y: i32) -> Result<()>;

    /// Presses a key combination such as `ctrl+c`.
    async fn key_press(&self, combo: &str) -> Result<()>;
    async fn type_text(&self, text: &str) -> Result<()>;

    async fn run_shell(&self, command: &str) -> Result<ShellResult>;

    async fn list_windows(&self) -> Result<Vec<WindowInfo>>;
    async fn focus_window(&self, handle: u64) -> Result<()>;

    /// Starts the agent loop on `task`. Progress arrives as events.
    async fn start_agent(&self, task: &str) -> Result<()>;
    async fn stop_agent(&self) -> Result<()>;

    /// The backend's own copy of the settings.
    async fn get_settings(&self) -> Result<Settings>;
    async fn save_settings(&self, settings: &Settings) -> Result<()>;

    /// Lists models served by a local model server at `base_url`.
    async fn list_local_models(
        &self,
        base_url: &str,
        api_key: Option<&str>,
    ) -> Result<Vec<ModelCatalogEntry>>;
}
