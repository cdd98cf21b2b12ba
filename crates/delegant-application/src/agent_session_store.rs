//! Agent session store: the live view of the running task.

use tokio::sync::watch;

use delegant_core::agent::{ActionEntry, AgentSession, AgentStatus, Cursor};

/// Holds the current [`AgentSession`]. Every setter is a single atomic
/// mutation observable through [`AgentSessionStore::subscribe`].
pub struct AgentSessionStore {
    state: watch::Sender<AgentSession>,
}

impl Default for AgentSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentSessionStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AgentSession::default());
        Self { state }
    }

    pub fn snapshot(&self) -> AgentSession {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> AgentStatus {
        self.state.borrow().status
    }

    pub fn subscribe(&self) -> watch::Receiver<AgentSession> {
        self.state.subscribe()
    }

    pub fn set_status(&self, status: AgentStatus) {
        self.state.send_modify(|s| s.status = status);
    }

    pub fn set_task(&self, task: impl Into<String>) {
        let task = task.into();
        self.state.send_modify(|s| s.task = task);
    }

    /// Appends an action and clears the thinking text in one step.
    pub fn add_action(&self, entry: ActionEntry) {
        self.state.send_modify(|s| s.push_action(entry));
    }

    pub fn set_thinking(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.send_modify(|s| s.thinking = text);
    }

    pub fn set_message(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.send_modify(|s| s.message = text);
    }

    pub fn set_estimated_seconds(&self, seconds: Option<u32>) {
        self.state.send_modify(|s| s.estimated_seconds = seconds);
    }

    pub fn set_screenshot(&self, base64: Option<String>) {
        self.state.send_modify(|s| s.screenshot = base64);
    }

    pub fn set_cursor(&self, cursor: Cursor) {
        self.state.send_modify(|s| s.cursor = cursor);
    }

    /// Back to the default session.
    pub fn reset(&self) {
        self.state.send_modify(|s| *s = AgentSession::default());
    }

    /// Resets and records a terminal error, keeping `message`.
    pub fn fail(&self, message: impl Into<String>) {
        let message = message.into();
        self.state.send_modify(|s| s.fail(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delegant_core::agent::ActionKind;

    fn action(n: u32) -> ActionEntry {
        ActionEntry::new(
            ActionKind::Pointer,
            format!("click {}", n),
            "2026-01-01T00:00:00Z",
            n,
            None,
        )
    }

    #[test]
    fn test_add_action_preserves_order() {
        let store = AgentSessionStore::new();
        store.set_thinking("planning");
        for n in 0..50 {
            store.add_action(action(n));
        }

        let session = store.snapshot();
        let iterations: Vec<u32> = session.actions.iter().map(|a| a.iteration).collect();
        assert_eq!(iterations, (0..50).collect::<Vec<_>>());
        assert!(session.thinking.is_empty());
    }

    #[test]
    fn test_reset_yields_default_tuple() {
        let store = AgentSessionStore::new();
        store.set_status(AgentStatus::Running);
        store.set_task("open browser");
        store.add_action(action(1));
        store.set_message("done");
        store.set_estimated_seconds(Some(30));
        store.set_screenshot(Some("AAAA".into()));
        store.set_cursor(Cursor { x: 4, y: 2 });

        store.reset();
        assert_eq!(store.snapshot(), AgentSession::default());
    }

    #[test]
    fn test_observers_see_whole_mutations() {
        let store = AgentSessionStore::new();
        let mut rx = store.subscribe();
        store.set_thinking("hm");
        store.add_action(action(7));

        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.actions.len(), 1);
        assert!(seen.thinking.is_empty());
    }

    #[test]
    fn test_fail_keeps_message() {
        let store = AgentSessionStore::new();
        store.set_status(AgentStatus::Running);
        store.set_task("x");
        store.fail("disk full");

        let session = store.snapshot();
        assert_eq!(session.status, AgentStatus::Error);
        assert_eq!(session.message, "disk full");
        assert!(session.task.is_empty());
    }
}
