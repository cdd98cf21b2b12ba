//! UI mode and toast queue.

use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

use delegant_core::ui::{ModeTrigger, Toast, ToastSeverity, UiMode, UiModeState};

/// How long a toast stays visible.
pub const DEFAULT_TOAST_TTL: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UiState {
    #[serde(flatten)]
    pub mode_state: UiModeState,
    pub toasts: Vec<Toast>,
}

pub struct UiStore {
    state: watch::Sender<UiState>,
    toast_ttl: Duration,
}

impl Default for UiStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UiStore {
    pub fn new() -> Self {
        Self::with_toast_ttl(DEFAULT_TOAST_TTL)
    }

    pub fn with_toast_ttl(toast_ttl: Duration) -> Self {
        let (state, _) = watch::channel(UiState::default());
        Self { state, toast_ttl }
    }

    pub fn snapshot(&self) -> UiState {
        self.state.borrow().clone()
    }

    pub fn mode_state(&self) -> UiModeState {
        self.state.borrow().mode_state
    }

    pub fn mode(&self) -> UiMode {
        self.state.borrow().mode_state.mode
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.state.borrow().toasts.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.state.subscribe()
    }

    /// Switches mode; `expanded` always resets.
    pub fn set_mode(&self, mode: UiMode) {
        self.state.send_modify(|s| s.mode_state.set_mode(mode));
    }

    /// Returns false when the request was ignored (expanding in start mode).
    pub fn set_expanded(&self, expanded: bool) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|s| {
            applied = s.mode_state.set_expanded(expanded);
            applied
        });
        applied
    }

    pub fn toggle_expanded(&self) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|s| {
            applied = s.mode_state.toggle_expanded();
            applied
        });
        applied
    }

    /// Applies `trigger` to the mode state machine.
    ///
    /// Returns the new state, or `None` when the pair is a no-op.
    pub fn transition(&self, trigger: ModeTrigger) -> Option<UiModeState> {
        let mut next = None;
        self.state.send_if_modified(|s| {
            next = s.mode_state.next(trigger);
            if let Some(state) = next {
                s.mode_state = state;
            }
            next.is_some()
        });
        next
    }

    /// Queues a toast and schedules its removal after the TTL.
    ///
    /// Removal is skipped when called outside a tokio runtime.
    pub fn add_toast(self: &Arc<Self>, message: impl Into<String>, severity: ToastSeverity) -> Uuid {
        let toast = Toast::new(message, severity);
        let id = toast.id;
        tracing::debug!("[UiStore] Toast ({}): {}", severity, toast.message);
        self.state.send_modify(|s| s.toasts.push(toast));

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let store: Weak<Self> = Arc::downgrade(self);
                let ttl = self.toast_ttl;
                handle.spawn(async move {
                    tokio::time::sleep(ttl).await;
                    if let Some(store) = store.upgrade() {
                        store.remove_toast(id);
                    }
                });
            }
            Err(_) => {
                tracing::warn!("[UiStore] No runtime, toast {} will not expire", id);
            }
        }
        id
    }

    /// Removes a toast. Removing an unknown id is a no-op.
    pub fn remove_toast(&self, id: Uuid) -> bool {
        self.state.send_if_modified(|s| {
            let before = s.toasts.len();
            s.toasts.retain(|t| t.id != id);
            s.toasts.len() != before
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_mode_resets_expanded() {
        let store = UiStore::new();
        store.set_mode(UiMode::Taskbar);
        assert!(store.set_expanded(true));
        store.set_mode(UiMode::Taskbar);
        assert_eq!(store.mode_state(), UiModeState::TASKBAR);
    }

    #[test]
    fn test_expand_ignored_in_start() {
        let store = UiStore::new();
        assert!(!store.set_expanded(true));
        assert!(!store.toggle_expanded());
        assert_eq!(store.mode_state(), UiModeState::START);
    }

    #[test]
    fn test_transition_reports_noops() {
        let store = UiStore::new();
        assert_eq!(store.transition(ModeTrigger::Collapse), None);
        assert_eq!(
            store.transition(ModeTrigger::AgentStarted),
            Some(UiModeState::TASKBAR)
        );
        assert_eq!(
            store.transition(ModeTrigger::Toggle),
            Some(UiModeState::TASKBAR_EXPANDED)
        );
        assert_eq!(
            store.transition(ModeTrigger::AgentFinished),
            Some(UiModeState::START)
        );
    }

    #[tokio::test]
    async fn test_remove_toast_is_idempotent() {
        let store = Arc::new(UiStore::new());
        let keep = store.add_toast("keep", ToastSeverity::Info);
        let drop_me = store.add_toast("drop", ToastSeverity::Error);

        assert!(store.remove_toast(drop_me));
        let once = store.toasts();
        assert!(!store.remove_toast(drop_me));
        assert_eq!(store.toasts(), once);
        assert_eq!(once.len(), 1);
        assert_eq!(once[0].id, keep);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toast_expires_after_ttl() {
        let store = Arc::new(UiStore::new());
        store.add_toast("saved", ToastSeverity::Success);

        tokio::time::sleep(Duration::from_millis(3999)).await;
        assert_eq!(store.toasts().len(), 1);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(store.toasts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_ttl() {
        let store = Arc::new(UiStore::with_toast_ttl(Duration::from_millis(10)));
        store.add_toast("a", ToastSeverity::Info);
        store.add_toast("b", ToastSeverity::Info);

        tokio::time::sleep(Duration::from_millis(11)).await;
        assert!(store.toasts().is_empty());
    }

    #[test]
    fn test_add_toast_without_runtime_still_queues() {
        let store = Arc::new(UiStore::new());
        store.add_toast("offline", ToastSeverity::Info);
        assert_eq!(store.toasts().len(), 1);
    }
}
