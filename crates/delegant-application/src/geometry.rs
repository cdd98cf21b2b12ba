//! Window geometry controller.
//!
//! Computes the placement for a [`WindowLayout`] from the current primary
//! display and drives the [`HostWindow`] through it.

use std::sync::{Arc, Mutex};

use delegant_core::error::Result;
use delegant_core::window::{DisplayMetrics, HostWindow, WindowGeometry, WindowLayout};

pub struct WindowGeometryController {
    window: Arc<dyn HostWindow>,
    last_applied: Mutex<Option<WindowGeometry>>,
}

impl WindowGeometryController {
    pub fn new(window: Arc<dyn HostWindow>) -> Self {
        Self {
            window,
            last_applied: Mutex::new(None),
        }
    }

    /// Primary display, or 1920x1080 at scale 1 when the host can't tell.
    pub async fn current_display(&self) -> DisplayMetrics {
        match self.window.primary_display().await {
            Ok(Some(display)) => display,
            Ok(None) => {
                tracing::debug!("[Geometry] No primary display reported, using fallback");
                DisplayMetrics::FALLBACK
            }
            Err(e) => {
                tracing::warn!("[Geometry] Failed to query primary display: {}", e);
                DisplayMetrics::FALLBACK
            }
        }
    }

    /// Recomputes `layout` for the current display and applies it.
    ///
    /// Stops at the first failing window command.
    pub async fn apply_layout(&self, layout: WindowLayout) -> Result<WindowGeometry> {
        let display = self.current_display().await;
        let geometry = layout.compute(&display);

        for command in geometry.commands() {
            self.window.apply(command).await?;
        }

        tracing::debug!(
            "[Geometry] Applied {} layout: {}x{} at ({}, {})",
            layout,
            geometry.width,
            geometry.height,
            geometry.x,
            geometry.y
        );
        if let Ok(mut last) = self.last_applied.lock() {
            *last = Some(geometry);
        }
        Ok(geometry)
    }

    pub fn window(&self) -> &Arc<dyn HostWindow> {
        &self.window
    }

    /// Geometry of the last fully applied layout.
    pub fn last_applied(&self) -> Option<WindowGeometry> {
        self.last_applied.lock().ok().and_then(|last| *last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delegant_core::window::WindowCommand;
    use delegant_infrastructure::HeadlessWindow;

    #[tokio::test]
    async fn test_missing_display_uses_fallback() {
        let window = Arc::new(HeadlessWindow::new(None));
        let controller = WindowGeometryController::new(window.clone());

        let geometry = controller.apply_layout(WindowLayout::Default).await.unwrap();
        assert_eq!((geometry.width, geometry.height), (1400, 900));
        assert_eq!((geometry.x, geometry.y), (260, 90));
        assert_eq!(controller.last_applied(), Some(geometry));
    }

    #[tokio::test]
    async fn test_taskbar_on_scaled_display() {
        let display = DisplayMetrics::new(2880, 1800, 2.0);
        let window = Arc::new(HeadlessWindow::new(Some(display)));
        let controller = WindowGeometryController::new(window.clone());

        controller.apply_layout(WindowLayout::Taskbar).await.unwrap();

        let snapshot = window.snapshot().await;
        assert_eq!((snapshot.width, snapshot.height), (840, 104));
        assert_eq!(snapshot.x, 1020);
        assert_eq!(snapshot.y, 1800 - 104 - 60);
        assert!(snapshot.always_on_top);
        assert!(!snapshot.decorations);
        assert!(!snapshot.resizable);
    }

    #[tokio::test]
    async fn test_default_layout_sets_flags_before_size() {
        let window = Arc::new(HeadlessWindow::default());
        let controller = WindowGeometryController::new(window.clone());

        controller.apply_layout(WindowLayout::Default).await.unwrap();

        let history = window.history().await;
        assert_eq!(history[0], WindowCommand::SetAlwaysOnTop(false));
        assert!(matches!(history[3], WindowCommand::SetSize { .. }));
        assert!(matches!(history[4], WindowCommand::SetPosition { .. }));
    }
}
