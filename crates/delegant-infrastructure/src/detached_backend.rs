//! Backend used when no agent engine is attached.
//!
//! Keeps the backend-side settings mirror in memory, accepts start/stop
//! requests without running anything, and answers local model listings by
//! querying the model server directly. Input synthesis, capture, shell and
//! window commands report [`DelegantError::Unsupported`].

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;

use delegant_core::backend::{AgentBackend, CaptureResult, MouseButton, ShellResult, WindowInfo};
use delegant_core::catalog::ModelCatalogEntry;
use delegant_core::error::{DelegantError, Result};
use delegant_core::settings::{Settings, normalize_local_endpoint};

use crate::catalog::fetch_json;

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<LocalModel>,
}

#[derive(Debug, Deserialize)]
struct LocalModel {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    modified_at: Option<String>,
}

#[derive(Debug, Default)]
struct EngineState {
    settings: Settings,
    current_task: Option<String>,
}

/// [`AgentBackend`] without an execution engine.
pub struct DetachedBackend {
    client: Client,
    state: RwLock<EngineState>,
}

impl DetachedBackend {
    pub fn new(client: Client) -> Self {
        Self::with_settings(client, Settings::default())
    }

    pub fn with_settings(client: Client, settings: Settings) -> Self {
        Self {
            client,
            state: RwLock::new(EngineState {
                settings,
                current_task: None,
            }),
        }
    }

    /// Task accepted by the last `start_agent`, cleared by `stop_agent`.
    pub async fn current_task(&self) -> Option<String> {
        self.state.read().await.current_task.clone()
    }

    fn unsupported(command: &str) -> DelegantError {
        DelegantError::unsupported(format!("{} requires an attached agent engine", command))
    }
}

#[async_trait]
impl AgentBackend for DetachedBackend {
    async fn take_screenshot(&self) -> Result<CaptureResult> {
        Err(Self::unsupported("take_screenshot"))
    }

    async fn mouse_move(&self, _x: i32, _y: i32) -> Result<()> {
        Err(Self::unsupported("mouse_move"))
    }

    async fn mouse_click(&self, _x: i32, _y: i32, _button: MouseButton) -> Result<()> {
        Err(Self::unsupported("mouse_click"))
    }

    async fn mouse_double_click(&self, _x: i32, _y: i32) -> Result<()> {
        Err(Self::unsupported("mouse_double_click"))
    }

    async fn mouse_scroll(&self, _x: i32, _y: i32, _clicks: i32) -> Result<()> {
        Err(Self::unsupported("mouse_scroll"))
    }

    async fn mouse_drag(&self, _start_x: i32, _start_y: i32, _end_x: i32, _end_y: i32) -> Result<()> {
        Err(Self::unsupported("mouse_drag"))
    }

    async fn key_press(&self, _combo: &str) -> Result<()> {
        Err(Self::unsupported("key_press"))
    }

    async fn type_text(&self, _text: &str) -> Result<()> {
        Err(Self::unsupported("type_text"))
    }

    async fn run_shell(&self, _command: &str) -> Result<ShellResult> {
        Err(Self::unsupported("run_shell"))
    }

    async fn list_windows(&self) -> Result<Vec<WindowInfo>> {
        Err(Self::unsupported("list_windows"))
    }

    async fn focus_window(&self, _handle: u64) -> Result<()> {
        Err(Self::unsupported("focus_window"))
    }

    async fn start_agent(&self, task: &str) -> Result<()> {
        tracing::info!("[DetachedBackend] Accepted task (no engine attached): {}", task);
        self.state.write().await.current_task = Some(task.to_string());
        Ok(())
    }

    async fn stop_agent(&self) -> Result<()> {
        if let Some(task) = self.state.write().await.current_task.take() {
            tracing::info!("[DetachedBackend] Stopped task: {}", task);
        }
        Ok(())
    }

    async fn get_settings(&self) -> Result<Settings> {
        Ok(self.state.read().await.settings.clone())
    }

    async fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.state.write().await.settings = settings.clone();
        Ok(())
    }

    async fn list_local_models(
        &self,
        base_url: &str,
        api_key: Option<&str>,
    ) -> Result<Vec<ModelCatalogEntry>> {
        let base = normalize_local_endpoint(base_url);
        let mut builder = self.client.get(format!("{}/api/tags", base));
        if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
            builder = builder.bearer_auth(key);
        }

        let mut models = fetch_json::<TagsResponse>(builder, "Ollama").await?.models;
        models.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));

        Ok(models
            .into_iter()
            .filter_map(|m| {
                let id = m.model.or_else(|| m.name.clone())?;
                let label = m.name.unwrap_or_else(|| id.clone());
                Some(ModelCatalogEntry::new(id, label))
            })
            .collect())
    }
}
