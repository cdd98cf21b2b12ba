//! In-process event channel.
//!
//! [`EventHub`] implements [`EventSource`] for a backend living in the same
//! process (or a recorded event stream being replayed). Payloads are delivered
//! synchronously, in registration order, on the emitting thread.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use async_trait::async_trait;
use serde_json::Value;

use delegant_core::error::Result;
use delegant_core::event::{BackendEvent, EventHandler, EventSource, EventTopic, Unlisten};

#[derive(Default)]
struct HubInner {
    next_id: u64,
    listeners: Vec<Listener>,
}

struct Listener {
    id: u64,
    topic: EventTopic,
    handler: EventHandler,
}

/// Fan-out hub for backend events. Cloning shares the same listener table.
#[derive(Clone, Default)]
pub struct EventHub {
    inner: Arc<Mutex<HubInner>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        lock_inner(&self.inner)
    }

    /// Delivers `payload` to every listener on `topic`.
    ///
    /// Returns how many listeners were reached.
    pub fn emit(&self, topic: EventTopic, payload: Value) -> usize {
        // Handlers run outside the lock so they may subscribe or detach.
        let handlers: Vec<EventHandler> = self
            .lock()
            .listeners
            .iter()
            .filter(|l| l.topic == topic)
            .map(|l| Arc::clone(&l.handler))
            .collect();

        for handler in &handlers {
            handler(payload.clone());
        }

        tracing::trace!(
            "[EventHub] {} delivered to {} listener(s)",
            topic,
            handlers.len()
        );
        handlers.len()
    }

    /// Encodes and emits a typed event.
    pub fn emit_event(&self, event: &BackendEvent) -> usize {
        self.emit(event.topic(), event.to_payload())
    }

    pub fn listener_count(&self, topic: EventTopic) -> usize {
        self.lock()
            .listeners
            .iter()
            .filter(|l| l.topic == topic)
            .count()
    }

    pub fn total_listeners(&self) -> usize {
        self.lock().listeners.len()
    }
}

fn lock_inner(inner: &Mutex<HubInner>) -> MutexGuard<'_, HubInner> {
    // Handlers never run under the lock, so a poisoned table is still consistent.
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl EventSource for EventHub {
    async fn listen(&self, topic: EventTopic, handler: EventHandler) -> Result<Box<dyn Unlisten>> {
        let id = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push(Listener { id, topic, handler });
            id
        };

        tracing::debug!("[EventHub] Listener {} attached to {}", id, topic);
        Ok(Box::new(HubSubscription {
            hub: Arc::downgrade(&self.inner),
            id,
        }))
    }
}

/// Detach handle for one hub listener.
struct HubSubscription {
    hub: Weak<Mutex<HubInner>>,
    id: u64,
}

impl Unlisten for HubSubscription {
    fn unlisten(self: Box<Self>) {
        if let Some(inner) = self.hub.upgrade() {
            lock_inner(&inner).listeners.retain(|l| l.id != self.id);
            tracing::debug!("[EventHub] Listener {} detached", self.id);
        }
    }
}
