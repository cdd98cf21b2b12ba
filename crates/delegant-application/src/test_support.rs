//! In-memory collaborators for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use delegant_core::backend::{AgentBackend, CaptureResult, MouseButton, ShellResult, WindowInfo};
use delegant_core::catalog::ModelCatalogEntry;
use delegant_core::error::{DelegantError, Result};
use delegant_core::settings::{Settings, SettingsRepository};

/// Ordered record of persistence calls shared between fakes.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    fn record(&self, call: &'static str) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Default)]
struct BackendState {
    settings: Settings,
    fail_settings: bool,
    stall_settings: bool,
    start_error: Option<String>,
    started: Vec<String>,
    stopped: usize,
    saved: Vec<Settings>,
    local_models: Vec<ModelCatalogEntry>,
    local_requests: Vec<(String, Option<String>)>,
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<BackendState>,
    log: CallLog,
}

impl FakeBackend {
    /// Records `"backend"` in `log` on every settings save.
    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    pub fn set_settings(&self, settings: Settings) {
        self.state.lock().unwrap().settings = settings;
    }

    pub fn fail_settings(&self, fail: bool) {
        self.state.lock().unwrap().fail_settings = fail;
    }

    /// Settings reads and writes never complete.
    pub fn stall_settings(&self, stall: bool) {
        self.state.lock().unwrap().stall_settings = stall;
    }

    pub fn fail_start(&self, message: &str) {
        self.state.lock().unwrap().start_error = Some(message.to_string());
    }

    pub fn set_local_models(&self, models: Vec<ModelCatalogEntry>) {
        self.state.lock().unwrap().local_models = models;
    }

    pub fn saved_settings(&self) -> Vec<Settings> {
        self.state.lock().unwrap().saved.clone()
    }

    pub fn started(&self) -> Vec<String> {
        self.state.lock().unwrap().started.clone()
    }

    pub fn stopped(&self) -> usize {
        self.state.lock().unwrap().stopped
    }

    pub fn local_requests(&self) -> Vec<(String, Option<String>)> {
        self.state.lock().unwrap().local_requests.clone()
    }
}

fn engine_missing() -> DelegantError {
    DelegantError::unsupported("fake backend")
}

#[async_trait]
impl AgentBackend for FakeBackend {
    async fn take_screenshot(&self) -> Result<CaptureResult> {
        Err(engine_missing())
    }

    async fn mouse_move(&self, _x: i32, _y: i32) -> Result<()> {
        Err(engine_missing())
    }

    async fn mouse_click(&self, _x: i32, _y: i32, _button: MouseButton) -> Result<()> {
        Err(engine_missing())
    }

    async fn mouse_double_click(&self, _x: i32, _y: i32) -> Result<()> {
        Err(engine_missing())
    }

    async fn mouse_scroll(&self, _x: i32, _y: i32, _clicks: i32) -> Result<()> {
        Err(engine_missing())
    }

    async fn mouse_drag(&self, _sx: i32, _sy: i32, _ex: i32, _ey: i32) -> Result<()> {
        Err(engine_missing())
    }

    async fn key_press(&self, _combo: &str) -> Result<()> {
        Err(engine_missing())
    }

    async fn type_text(&self, _text: &str) -> Result<()> {
        Err(engine_missing())
    }

    async fn run_shell(&self, _command: &str) -> Result<ShellResult> {
        Err(engine_missing())
    }

    async fn list_windows(&self) -> Result<Vec<WindowInfo>> {
        Ok(Vec::new())
    }

    async fn focus_window(&self, _handle: u64) -> Result<()> {
        Err(engine_missing())
    }

    async fn start_agent(&self, task: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.start_error {
            return Err(DelegantError::backend(message.clone()));
        }
        state.started.push(task.to_string());
        Ok(())
    }

    async fn stop_agent(&self) -> Result<()> {
        self.state.lock().unwrap().stopped += 1;
        Ok(())
    }

    async fn get_settings(&self) -> Result<Settings> {
        let stall = self.state.lock().unwrap().stall_settings;
        if stall {
            std::future::pending::<()>().await;
        }
        let state = self.state.lock().unwrap();
        if state.fail_settings {
            return Err(DelegantError::backend("settings unavailable"));
        }
        Ok(state.settings.clone())
    }

    async fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.log.record("backend");
        let stall = self.state.lock().unwrap().stall_settings;
        if stall {
            std::future::pending::<()>().await;
        }
        let mut state = self.state.lock().unwrap();
        if state.fail_settings {
            return Err(DelegantError::backend("settings unavailable"));
        }
        state.saved.push(settings.clone());
        state.settings = settings.clone();
        Ok(())
    }

    async fn list_local_models(
        &self,
        base_url: &str,
        api_key: Option<&str>,
    ) -> Result<Vec<ModelCatalogEntry>> {
        let mut state = self.state.lock().unwrap();
        state
            .local_requests
            .push((base_url.to_string(), api_key.map(str::to_string)));
        Ok(state.local_models.clone())
    }
}

#[derive(Default)]
pub struct MemorySettingsRepository {
    stored: Mutex<Option<Settings>>,
    saved: Mutex<Option<Settings>>,
    failing: bool,
    stalled: bool,
    log: CallLog,
}

impl MemorySettingsRepository {
    pub fn with(settings: Settings) -> Self {
        Self {
            stored: Mutex::new(Some(settings)),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    /// Every call to `load` or `save` never completes.
    pub fn stalled() -> Self {
        Self {
            stalled: true,
            ..Default::default()
        }
    }

    /// Records `"repository"` in `log` on every save.
    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    /// Last record written through `save`.
    pub fn saved(&self) -> Option<Settings> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl SettingsRepository for MemorySettingsRepository {
    async fn load(&self) -> Result<Option<Settings>> {
        if self.stalled {
            std::future::pending::<()>().await;
        }
        if self.failing {
            return Err(DelegantError::io("store unavailable"));
        }
        Ok(self.stored.lock().unwrap().clone())
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        self.log.record("repository");
        if self.stalled {
            std::future::pending::<()>().await;
        }
        if self.failing {
            return Err(DelegantError::io("store unavailable"));
        }
        *self.saved.lock().unwrap() = Some(settings.clone());
        Ok(())
    }
}
