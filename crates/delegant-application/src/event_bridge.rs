//! Backend event bridge.
//!
//! Subscribes to every backend topic, decodes payloads, and applies them to
//! the stores in arrival order through a single dispatcher task. The
//! subscriptions live exactly as long as the returned [`MountedBridge`].

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use delegant_core::agent::AgentStatus;
use delegant_core::event::{
    BackendEvent, EventHandler, EventSource, EventTopic, StatusChange, Unlisten,
};
use delegant_core::ui::{ModeTrigger, ToastSeverity};

use crate::agent_session_store::AgentSessionStore;
use crate::mode_coordinator::ModeCoordinator;
use crate::ui_store::UiStore;

enum BridgeMessage {
    Event(BackendEvent),
    Flush(oneshot::Sender<()>),
}

#[derive(Default)]
struct RegistryInner {
    released: bool,
    handles: Vec<Box<dyn Unlisten>>,
}

/// Collects detach handles as registrations resolve.
///
/// Once released, every held handle has been detached and any handle adopted
/// afterwards is detached on arrival.
#[derive(Default)]
pub struct SubscriptionRegistry {
    inner: Mutex<RegistryInner>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Takes ownership of `handle`. Returns false if the registry was already
    /// released, in which case the handle has been detached.
    pub fn adopt(&self, handle: Box<dyn Unlisten>) -> bool {
        let mut inner = self.lock();
        if inner.released {
            drop(inner);
            handle.unlisten();
            return false;
        }
        inner.handles.push(handle);
        true
    }

    /// Detaches every held handle. Returns how many were detached; later
    /// calls detach nothing.
    pub fn release_all(&self) -> usize {
        let handles = {
            let mut inner = self.lock();
            if inner.released {
                return 0;
            }
            inner.released = true;
            std::mem::take(&mut inner.handles)
        };

        let count = handles.len();
        for handle in handles {
            handle.unlisten();
        }
        count
    }

    pub fn is_released(&self) -> bool {
        self.lock().released
    }

    /// Number of handles currently held.
    pub fn active(&self) -> usize {
        self.lock().handles.len()
    }
}

/// Routes backend events into the stores.
#[derive(Clone)]
pub struct EventBridge {
    source: Arc<dyn EventSource>,
    session: Arc<AgentSessionStore>,
    ui: Arc<UiStore>,
    coordinator: Arc<ModeCoordinator>,
}

impl EventBridge {
    pub fn new(
        source: Arc<dyn EventSource>,
        session: Arc<AgentSessionStore>,
        ui: Arc<UiStore>,
        coordinator: Arc<ModeCoordinator>,
    ) -> Self {
        Self {
            source,
            session,
            ui,
            coordinator,
        }
    }

    /// Starts the dispatcher and requests one subscription per topic.
    ///
    /// Registrations resolve in the background; await
    /// [`MountedBridge::ready`] to know they are all in place.
    pub fn mount(&self) -> MountedBridge {
        let registry = Arc::new(SubscriptionRegistry::new());
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();

        let dispatcher = tokio::spawn(self.clone().dispatch(rx, cancel.clone()));

        let pending = EventTopic::all()
            .map(|topic| {
                let source = Arc::clone(&self.source);
                let registry = Arc::clone(&registry);
                let handler = route(topic, tx.clone(), Arc::clone(&registry));
                tokio::spawn(async move {
                    match source.listen(topic, handler).await {
                        Ok(handle) => {
                            if !registry.adopt(handle) {
                                tracing::debug!(
                                    "[EventBridge] {} registered after unmount, detached",
                                    topic
                                );
                            }
                        }
                        Err(e) => {
                            tracing::warn!("[EventBridge] Failed to subscribe to {}: {}", topic, e);
                        }
                    }
                })
            })
            .collect();

        tracing::debug!("[EventBridge] Mounted");
        MountedBridge {
            registry,
            cancel,
            tx,
            dispatcher: Some(dispatcher),
            pending,
        }
    }

    async fn dispatch(self, mut rx: mpsc::UnboundedReceiver<BridgeMessage>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                message = rx.recv() => match message {
                    Some(BridgeMessage::Event(event)) => self.apply(event).await,
                    Some(BridgeMessage::Flush(ack)) => {
                        let _ = ack.send(());
                    }
                    None => break,
                },
            }
        }
        tracing::debug!("[EventBridge] Dispatcher stopped");
    }

    /// Applies one decoded event to the stores.
    pub async fn apply(&self, event: BackendEvent) {
        match event {
            BackendEvent::StatusChanged(StatusChange::Idle) => {
                self.session.reset();
                self.coordinator.fire(ModeTrigger::AgentFinished).await;
            }
            BackendEvent::StatusChanged(StatusChange::Running) => {
                self.session.set_status(AgentStatus::Running);
            }
            BackendEvent::StatusChanged(StatusChange::Error(message)) => {
                tracing::warn!("[EventBridge] Agent reported error: {}", message);
                self.ui
                    .add_toast(format!("Agent Error: {}", message), ToastSeverity::Error);
                self.session.fail(message);
                self.coordinator.fire(ModeTrigger::AgentFinished).await;
            }
            BackendEvent::Screenshot(shot) => self.session.set_screenshot(Some(shot.base64)),
            BackendEvent::ActionExecuted(action) => self.session.add_action(action.into_entry()),
            BackendEvent::Thinking(text) => self.session.set_thinking(text),
            BackendEvent::Message(text) => self.session.set_message(text),
            BackendEvent::CursorMoved(cursor) => self.session.set_cursor(cursor),
            BackendEvent::EstimatedTime(seconds) => self.session.set_estimated_seconds(Some(seconds)),
        }
    }
}

fn route(
    topic: EventTopic,
    tx: mpsc::UnboundedSender<BridgeMessage>,
    registry: Arc<SubscriptionRegistry>,
) -> EventHandler {
    Arc::new(move |payload: Value| {
        if registry.is_released() {
            return;
        }
        match BackendEvent::decode(topic, payload) {
            Ok(event) => {
                let _ = tx.send(BridgeMessage::Event(event));
            }
            Err(e) => {
                tracing::warn!("[EventBridge] Ignoring {} event: {}", topic, e);
            }
        }
    })
}

/// Live subscriptions plus the dispatcher. Dropping it releases everything.
pub struct MountedBridge {
    registry: Arc<SubscriptionRegistry>,
    cancel: CancellationToken,
    tx: mpsc::UnboundedSender<BridgeMessage>,
    dispatcher: Option<JoinHandle<()>>,
    pending: Vec<JoinHandle<()>>,
}

impl MountedBridge {
    /// Waits until every subscription request has resolved.
    pub async fn ready(&mut self) {
        for registration in self.pending.drain(..) {
            if let Err(e) = registration.await {
                tracing::warn!("[EventBridge] Subscription task failed: {}", e);
            }
        }
    }

    /// Waits until every event queued so far has been applied.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(BridgeMessage::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }

    pub fn registry(&self) -> Arc<SubscriptionRegistry> {
        Arc::clone(&self.registry)
    }

    fn release(&self) {
        let detached = self.registry.release_all();
        self.cancel.cancel();
        if detached > 0 {
            tracing::debug!("[EventBridge] Released {} subscription(s)", detached);
        }
    }

    /// Releases all subscriptions and waits for the dispatcher to stop.
    ///
    /// Registrations still in flight are detached when they resolve.
    pub async fn unmount(mut self) {
        self.release();
        if let Some(dispatcher) = self.dispatcher.take() {
            if let Err(e) = dispatcher.await {
                tracing::warn!("[EventBridge] Dispatcher task failed: {}", e);
            }
        }
    }
}

impl Drop for MountedBridge {
    fn drop(&mut self) {
        self.release();
    }
}
