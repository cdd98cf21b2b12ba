//! Settings store.
//!
//! Owns the process-wide [`Settings`] and the settings-dialog flag. Patches
//! are applied in memory only; persistence happens on an explicit
//! [`SettingsStore::save`], which writes to the backend first and the
//! persistent repository second.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use delegant_core::backend::AgentBackend;
use delegant_core::error::{DelegantError, Result};
use delegant_core::settings::{
    ProviderKind, Settings, SettingsPatch, SettingsRepository, WizardStep,
};
use delegant_core::window::HostWindow;

/// Upper bound for each collaborator call made while loading.
const LOAD_STEP_TIMEOUT: Duration = Duration::from_secs(10);

/// Observable state of the settings store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SettingsState {
    pub settings: Settings,
    /// Set once `load` has finished, whatever the outcome.
    pub loaded: bool,
    /// Whether the settings dialog is open.
    pub show_modal: bool,
}

pub struct SettingsStore {
    state: watch::Sender<SettingsState>,
    backend: Arc<dyn AgentBackend>,
    repository: Arc<dyn SettingsRepository>,
}

impl SettingsStore {
    pub fn new(backend: Arc<dyn AgentBackend>, repository: Arc<dyn SettingsRepository>) -> Self {
        let (state, _) = watch::channel(SettingsState::default());
        Self {
            state,
            backend,
            repository,
        }
    }

    pub fn snapshot(&self) -> SettingsState {
        self.state.borrow().clone()
    }

    pub fn settings(&self) -> Settings {
        self.state.borrow().settings.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.state.borrow().loaded
    }

    pub fn subscribe(&self) -> watch::Receiver<SettingsState> {
        self.state.subscribe()
    }

    /// Loads settings once at startup.
    ///
    /// Order: persistent repository, then the backend's copy, then defaults.
    /// Never fails; `loaded` is always set afterwards.
    pub async fn load(&self) {
        match bounded(self.repository.load()).await {
            Ok(Some(settings)) => {
                let settings = self.install(settings, "persistent store");
                if let Err(e) = bounded(self.backend.save_settings(&settings)).await {
                    tracing::warn!("[SettingsStore] Failed to push loaded settings to backend: {}", e);
                }
                return;
            }
            Ok(None) => {
                tracing::debug!("[SettingsStore] No persisted settings, asking backend");
            }
            Err(e) => {
                tracing::warn!(
                    "[SettingsStore] Persistent store unavailable ({}), asking backend",
                    e
                );
            }
        }

        match bounded(self.backend.get_settings()).await {
            Ok(settings) => {
                self.install(settings, "backend");
            }
            Err(e) => {
                tracing::warn!("[SettingsStore] Backend settings unavailable ({}), using defaults", e);
                self.state.send_modify(|state| state.loaded = true);
            }
        }
    }

    fn install(&self, mut settings: Settings, source: &str) -> Settings {
        if settings.apply_legacy_setup_migration() {
            tracing::info!("[SettingsStore] Credentials found on a pre-wizard record, marking setup complete");
        }
        tracing::info!(
            "[SettingsStore] Loaded settings from {} (provider: {}, model: {})",
            source,
            settings.provider,
            settings.model
        );
        self.state.send_modify(|state| {
            state.settings = settings.clone();
            state.loaded = true;
        });
        settings
    }

    /// Merges a partial update in memory.
    pub fn update(&self, patch: SettingsPatch) {
        let mut rejected = Vec::new();
        self.state
            .send_modify(|state| rejected = state.settings.apply(patch));
        for field in rejected {
            tracing::warn!("[SettingsStore] Ignoring zero value for {}", field);
        }
    }

    /// Persists the current settings: backend first, repository second.
    ///
    /// Each failure is logged independently; neither aborts the other.
    pub async fn save(&self) {
        let settings = self.settings();

        if let Err(e) = self.backend.save_settings(&settings).await {
            tracing::error!("[SettingsStore] Failed to save settings to backend: {}", e);
        }
        if let Err(e) = self.repository.save(&settings).await {
            tracing::error!("[SettingsStore] Failed to persist settings: {}", e);
        }
    }

    /// Reopens the setup wizard: clears `setup_complete`, closes the dialog,
    /// and saves in the background.
    pub fn reset_wizard(self: &Arc<Self>) -> JoinHandle<()> {
        self.state.send_modify(|state| {
            state.settings.setup_complete = false;
            state.show_modal = false;
        });

        let store = Arc::clone(self);
        tokio::spawn(async move { store.save().await })
    }

    /// Finishes the setup wizard.
    pub async fn complete_setup(&self) {
        self.state
            .send_modify(|state| state.settings.setup_complete = true);
        self.save().await;
    }

    /// Switches provider and selects its first static model.
    pub fn select_provider(&self, kind: ProviderKind) {
        self.state.send_modify(|state| {
            state.settings.provider = kind;
            state.settings.model = kind.profile().default_model().to_string();
        });
    }

    pub fn set_credential(&self, kind: ProviderKind, value: impl Into<String>) {
        self.update(SettingsPatch::credential(kind, value));
    }

    /// Whether the setup wizard may leave `step` with the current settings.
    pub fn can_proceed(&self, step: WizardStep) -> bool {
        step.can_proceed(&self.state.borrow().settings)
    }

    /// Seeds the agent display size from the monitor the window is on.
    ///
    /// Runs when the setup wizard opens. Returns `false` and leaves the
    /// settings alone when the host reports no display or the query fails.
    pub async fn detect_display(&self, window: &dyn HostWindow) -> bool {
        let metrics = match window.primary_display().await {
            Ok(Some(metrics)) => metrics,
            Ok(None) => return false,
            Err(e) => {
                tracing::debug!("[SettingsStore] Display detection failed: {}", e);
                return false;
            }
        };

        tracing::info!(
            "[SettingsStore] Detected display {}x{}",
            metrics.width,
            metrics.height
        );
        let mut rejected = Vec::new();
        self.state.send_modify(|state| {
            rejected = state.settings.apply(SettingsPatch {
                display_width: Some(metrics.width),
                display_height: Some(metrics.height),
                ..Default::default()
            })
        });
        rejected.is_empty()
    }

    pub fn set_show_modal(&self, show: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.show_modal != show;
            state.show_modal = show;
            changed
        });
    }
}

async fn bounded<T>(call: impl std::future::Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(LOAD_STEP_TIMEOUT, call)
        .await
        .map_err(|_| DelegantError::internal("timed out"))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CallLog, FakeBackend, MemorySettingsRepository};
    use delegant_core::window::DisplayMetrics;
    use delegant_infrastructure::HeadlessWindow;

    fn store(backend: Arc<FakeBackend>, repo: Arc<MemorySettingsRepository>) -> Arc<SettingsStore> {
        Arc::new(SettingsStore::new(backend, repo))
    }

    #[tokio::test]
    async fn test_load_from_repository_applies_legacy_migration() {
        let backend = Arc::new(FakeBackend::default());
        let repo = Arc::new(MemorySettingsRepository::with(Settings {
            anthropic_api_key: "x".into(),
            setup_complete: false,
            ..Default::default()
        }));
        let store = store(backend.clone(), repo);

        store.load().await;

        let state = store.snapshot();
        assert!(state.loaded);
        assert!(state.settings.setup_complete);
        // The merged result is mirrored to the backend.
        assert!(backend.saved_settings().last().unwrap().setup_complete);
    }

    #[tokio::test]
    async fn test_load_falls_back_to_backend() {
        let backend = Arc::new(FakeBackend::default());
        backend.set_settings(Settings {
            model: "o3".into(),
            ..Default::default()
        });
        let repo = Arc::new(MemorySettingsRepository::failing());
        let store = store(backend, repo);

        store.load().await;

        assert!(store.is_loaded());
        assert_eq!(store.settings().model, "o3");
    }

    #[tokio::test]
    async fn test_load_total_failure_uses_defaults() {
        let backend = Arc::new(FakeBackend::default());
        backend.fail_settings(true);
        let repo = Arc::new(MemorySettingsRepository::failing());
        let store = store(backend, repo);

        store.load().await;

        let state = store.snapshot();
        assert!(state.loaded);
        assert_eq!(state.settings, Settings::default());
    }

    #[tokio::test]
    async fn test_save_attempts_both_targets_independently() {
        let backend = Arc::new(FakeBackend::default());
        backend.fail_settings(true);
        let repo = Arc::new(MemorySettingsRepository::default());
        let store = store(backend, repo.clone());

        store.update(SettingsPatch {
            model: Some("gpt-4.1".into()),
            ..Default::default()
        });
        assert!(repo.saved().is_none(), "update must not persist");

        store.save().await;
        assert_eq!(repo.saved().unwrap().model, "gpt-4.1");
    }

    #[tokio::test]
    async fn test_reset_wizard_closes_modal_and_saves() {
        let backend = Arc::new(FakeBackend::default());
        let repo = Arc::new(MemorySettingsRepository::default());
        let store = store(backend, repo.clone());
        store.update(SettingsPatch {
            setup_complete: Some(true),
            ..Default::default()
        });
        store.set_show_modal(true);

        store.reset_wizard().await.unwrap();

        let state = store.snapshot();
        assert!(!state.settings.setup_complete);
        assert!(!state.show_modal);
        assert!(!repo.saved().unwrap().setup_complete);
    }

    #[tokio::test]
    async fn test_select_provider_picks_first_static_model() {
        let store = store(
            Arc::new(FakeBackend::default()),
            Arc::new(MemorySettingsRepository::default()),
        );
        store.select_provider(ProviderKind::OpenRouter);
        let settings = store.settings();
        assert_eq!(settings.provider, ProviderKind::OpenRouter);
        assert_eq!(settings.model, "anthropic/claude-sonnet-4.6");
    }

    #[tokio::test]
    async fn test_complete_setup_persists_flag() {
        let repo = Arc::new(MemorySettingsRepository::default());
        let store = store(Arc::new(FakeBackend::default()), repo.clone());
        store.set_credential(ProviderKind::Anthropic, "sk-ant");

        store.complete_setup().await;

        let saved = repo.saved().unwrap();
        assert!(saved.setup_complete);
        assert_eq!(saved.anthropic_api_key, "sk-ant");
    }

    #[tokio::test]
    async fn test_save_writes_backend_before_repository() {
        let log = CallLog::default();
        let backend = Arc::new(FakeBackend::with_log(log.clone()));
        let repo = Arc::new(MemorySettingsRepository::default().with_log(log.clone()));
        let store = store(backend, repo);

        store.save().await;

        assert_eq!(log.calls(), vec!["backend", "repository"]);
    }

    #[tokio::test]
    async fn test_save_order_holds_when_backend_fails() {
        let log = CallLog::default();
        let backend = Arc::new(FakeBackend::with_log(log.clone()));
        backend.fail_settings(true);
        let repo = Arc::new(MemorySettingsRepository::default().with_log(log.clone()));
        let store = store(backend, repo.clone());

        store.save().await;

        assert_eq!(log.calls(), vec!["backend", "repository"]);
        assert!(repo.saved().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_gives_up_on_stalled_collaborators() {
        let backend = Arc::new(FakeBackend::default());
        backend.set_settings(Settings {
            model: "never-seen".into(),
            ..Default::default()
        });
        backend.stall_settings(true);
        let repo = Arc::new(MemorySettingsRepository::stalled());
        let store = store(backend, repo);

        let started = tokio::time::Instant::now();
        store.load().await;
        let elapsed = started.elapsed();

        let state = store.snapshot();
        assert!(state.loaded);
        assert_eq!(state.settings, Settings::default());
        // One timeout for the repository, one for the backend.
        assert!(elapsed >= LOAD_STEP_TIMEOUT * 2);
        assert!(elapsed < LOAD_STEP_TIMEOUT * 3);
    }

    #[tokio::test]
    async fn test_can_proceed_follows_current_settings() {
        let store = store(
            Arc::new(FakeBackend::default()),
            Arc::new(MemorySettingsRepository::default()),
        );
        assert!(!store.can_proceed(WizardStep::Credential));

        store.set_credential(ProviderKind::Anthropic, "sk-ant-api03-abc");
        assert!(store.can_proceed(WizardStep::Credential));

        store.select_provider(ProviderKind::OpenAi);
        assert!(!store.can_proceed(WizardStep::Credential));

        store.select_provider(ProviderKind::Ollama);
        assert!(store.can_proceed(WizardStep::Credential));
        assert!(store.can_proceed(WizardStep::Display));
    }

    #[tokio::test]
    async fn test_detect_display_copies_monitor_size() {
        let store = store(
            Arc::new(FakeBackend::default()),
            Arc::new(MemorySettingsRepository::default()),
        );
        let window = HeadlessWindow::new(Some(DisplayMetrics::new(2560, 1440, 2.0)));

        assert!(store.detect_display(&window).await);

        let settings = store.settings();
        assert_eq!((settings.display_width, settings.display_height), (2560, 1440));
    }

    #[tokio::test]
    async fn test_detect_display_without_monitor_keeps_settings() {
        let store = store(
            Arc::new(FakeBackend::default()),
            Arc::new(MemorySettingsRepository::default()),
        );
        let mut rx = store.subscribe();

        assert!(!store.detect_display(&HeadlessWindow::new(None)).await);

        assert_eq!(store.settings(), Settings::default());
        assert!(!rx.has_changed().unwrap());
    }
}
