//! Task submission from the start screen.

use std::sync::Arc;

use serde::Serialize;

use delegant_core::backend::AgentBackend;
use delegant_core::ui::{ModeTrigger, ToastSeverity};

use crate::agent_session_store::AgentSessionStore;
use crate::mode_coordinator::ModeCoordinator;
use crate::settings_store::SettingsStore;
use crate::ui_store::UiStore;

pub const MISSING_CREDENTIAL_MESSAGE: &str = "Please set your API key in settings first.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "error", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Blank task, nothing happened.
    Ignored,
    /// The selected provider needs a credential; the settings dialog was opened.
    MissingCredential,
    Started,
    /// The backend refused the task.
    Failed(String),
}

pub struct TaskLauncher {
    settings: Arc<SettingsStore>,
    session: Arc<AgentSessionStore>,
    ui: Arc<UiStore>,
    coordinator: Arc<ModeCoordinator>,
    backend: Arc<dyn AgentBackend>,
}

impl TaskLauncher {
    pub fn new(
        settings: Arc<SettingsStore>,
        session: Arc<AgentSessionStore>,
        ui: Arc<UiStore>,
        coordinator: Arc<ModeCoordinator>,
        backend: Arc<dyn AgentBackend>,
    ) -> Self {
        Self {
            settings,
            session,
            ui,
            coordinator,
            backend,
        }
    }

    /// Submits `task` to the backend and switches to the taskbar on success.
    pub async fn submit(&self, task: &str) -> SubmitOutcome {
        let task = task.trim();
        if task.is_empty() {
            return SubmitOutcome::Ignored;
        }

        if !self.settings.settings().has_usable_credential() {
            tracing::info!("[TaskLauncher] No credential for the selected provider");
            self.ui
                .add_toast(MISSING_CREDENTIAL_MESSAGE, ToastSeverity::Error);
            self.settings.set_show_modal(true);
            return SubmitOutcome::MissingCredential;
        }

        self.settings.save().await;
        self.session.set_task(task);

        match self.backend.start_agent(task).await {
            Ok(()) => {
                tracing::info!("[TaskLauncher] Started task: {}", task);
                self.coordinator.fire(ModeTrigger::AgentStarted).await;
                SubmitOutcome::Started
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!("[TaskLauncher] Failed to start task: {}", message);
                self.ui.add_toast(message.clone(), ToastSeverity::Error);
                self.session.reset();
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Asks the backend to stop; the UI follows the resulting `idle` event.
    pub async fn stop(&self) {
        if let Err(e) = self.backend.stop_agent().await {
            tracing::error!("[TaskLauncher] Failed to stop agent: {}", e);
            self.ui
                .add_toast(format!("Failed to stop agent: {}", e), ToastSeverity::Error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::WindowGeometryController;
    use crate::test_support::{FakeBackend, MemorySettingsRepository};
    use delegant_core::agent::AgentStatus;
    use delegant_core::settings::{ProviderKind, SettingsPatch};
    use delegant_core::ui::UiModeState;
    use delegant_infrastructure::HeadlessWindow;

    struct Harness {
        launcher: TaskLauncher,
        backend: Arc<FakeBackend>,
        settings: Arc<SettingsStore>,
        session: Arc<AgentSessionStore>,
        ui: Arc<UiStore>,
    }

    fn harness() -> Harness {
        let backend = Arc::new(FakeBackend::default());
        let settings = Arc::new(SettingsStore::new(
            backend.clone(),
            Arc::new(MemorySettingsRepository::default()),
        ));
        let session = Arc::new(AgentSessionStore::new());
        let ui = Arc::new(UiStore::new());
        let geometry = Arc::new(WindowGeometryController::new(Arc::new(HeadlessWindow::default())));
        let coordinator = Arc::new(ModeCoordinator::new(ui.clone(), geometry));
        let launcher = TaskLauncher::new(
            settings.clone(),
            session.clone(),
            ui.clone(),
            coordinator,
            backend.clone(),
        );
        Harness {
            launcher,
            backend,
            settings,
            session,
            ui,
        }
    }

    #[tokio::test]
    async fn test_blank_task_is_ignored() {
        let h = harness();
        assert_eq!(h.launcher.submit("   ").await, SubmitOutcome::Ignored);
        assert!(h.backend.started().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_opens_settings() {
        let h = harness();

        assert_eq!(h.launcher.submit("open browser").await, SubmitOutcome::MissingCredential);

        assert!(h.backend.started().is_empty());
        assert!(h.settings.snapshot().show_modal);
        let toasts = h.ui.toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].message, MISSING_CREDENTIAL_MESSAGE);
        assert_eq!(toasts[0].severity, ToastSeverity::Error);
    }

    #[tokio::test]
    async fn test_local_provider_needs_no_credential() {
        let h = harness();
        h.settings.update(SettingsPatch {
            provider: Some(ProviderKind::Ollama),
            ..Default::default()
        });

        assert_eq!(h.launcher.submit("summarize").await, SubmitOutcome::Started);
        assert_eq!(h.ui.mode_state(), UiModeState::TASKBAR);
    }

    #[tokio::test]
    async fn test_backend_failure_stays_in_start() {
        let h = harness();
        h.settings.set_credential(ProviderKind::Anthropic, "sk-ant");
        h.backend.fail_start("engine busy");

        let outcome = h.launcher.submit("open browser").await;

        let SubmitOutcome::Failed(message) = outcome else {
            panic!("expected failure, got {:?}", outcome);
        };
        assert!(message.contains("engine busy"));
        assert_eq!(h.ui.mode_state(), UiModeState::START);
        assert_eq!(h.session.status(), AgentStatus::Idle);
        assert!(h.session.snapshot().task.is_empty());
        assert!(h.ui.toasts()[0].message.contains("engine busy"));
    }

    #[tokio::test]
    async fn test_stop_forwards_to_backend() {
        let h = harness();
        h.launcher.stop().await;
        assert_eq!(h.backend.stopped(), 1);
    }
}
