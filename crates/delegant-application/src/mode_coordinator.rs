//! Drives the UI mode state machine and the window geometry together.

use std::sync::Arc;

use tokio::sync::Mutex;

use delegant_core::ui::ModeTrigger;
use delegant_core::window::{WindowGeometry, WindowLayout};

use crate::geometry::WindowGeometryController;
use crate::ui_store::UiStore;

/// The only component that fires [`ModeTrigger`]s.
///
/// Each trigger updates the UI store first and then re-applies the layout
/// for the new state. Triggers are serialized, so window commands from two
/// transitions never interleave.
pub struct ModeCoordinator {
    ui: Arc<UiStore>,
    geometry: Arc<WindowGeometryController>,
    gate: Mutex<()>,
}

impl ModeCoordinator {
    pub fn new(ui: Arc<UiStore>, geometry: Arc<WindowGeometryController>) -> Self {
        Self {
            ui,
            geometry,
            gate: Mutex::new(()),
        }
    }

    pub fn geometry(&self) -> &Arc<WindowGeometryController> {
        &self.geometry
    }

    /// Fires `trigger`. Returns the applied geometry, or `None` when the
    /// trigger was a no-op or the window rejected a command.
    pub async fn fire(&self, trigger: ModeTrigger) -> Option<WindowGeometry> {
        // Held across `apply_layout` so one transition's window commands finish
        // before the next transition reads the UI state. This is the only lock
        // in the crate held over an await.
        let _guard = self.gate.lock().await;

        let state = self.ui.transition(trigger)?;
        let layout = WindowLayout::for_state(&state);
        tracing::debug!("[ModeCoordinator] {} -> {}", trigger, layout);

        match self.geometry.apply_layout(layout).await {
            Ok(geometry) => Some(geometry),
            Err(e) => {
                tracing::error!("[ModeCoordinator] Failed to apply {} layout: {}", layout, e);
                None
            }
        }
    }

    pub async fn expand(&self) -> Option<WindowGeometry> {
        self.fire(ModeTrigger::Expand).await
    }

    pub async fn collapse(&self) -> Option<WindowGeometry> {
        self.fire(ModeTrigger::Collapse).await
    }

    pub async fn toggle(&self) -> Option<WindowGeometry> {
        self.fire(ModeTrigger::Toggle).await
    }
}
