//! In-memory host window.
//!
//! Records every primitive it receives and tracks the resulting placement,
//! so geometry transitions can be driven and inspected without a windowing
//! system.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;

use delegant_core::error::{DelegantError, Result};
use delegant_core::window::{DisplayMetrics, HostWindow, WindowCommand};

/// Placement and flags as last applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowSnapshot {
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    pub always_on_top: bool,
    pub decorations: bool,
    pub resizable: bool,
}

impl Default for WindowSnapshot {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            x: 0,
            y: 0,
            always_on_top: false,
            decorations: true,
            resizable: true,
        }
    }
}

#[derive(Default)]
struct WindowState {
    current: WindowSnapshot,
    history: Vec<WindowCommand>,
}

/// [`HostWindow`] without a native window behind it.
pub struct HeadlessWindow {
    display: Option<DisplayMetrics>,
    state: Mutex<WindowState>,
    rejecting: AtomicBool,
}

impl HeadlessWindow {
    /// A window on `display`; `None` simulates a host reporting no display.
    pub fn new(display: Option<DisplayMetrics>) -> Self {
        Self {
            display,
            state: Mutex::new(WindowState::default()),
            rejecting: AtomicBool::new(false),
        }
    }

    /// While set, every command fails and leaves the placement untouched.
    pub fn reject_commands(&self, reject: bool) {
        self.rejecting.store(reject, Ordering::SeqCst);
    }

    pub async fn snapshot(&self) -> WindowSnapshot {
        self.state.lock().await.current
    }

    /// Every command received, oldest first.
    pub async fn history(&self) -> Vec<WindowCommand> {
        self.state.lock().await.history.clone()
    }

    pub async fn clear_history(&self) {
        self.state.lock().await.history.clear();
    }

    async fn record(&self, command: WindowCommand) -> Result<()> {
        if self.rejecting.load(Ordering::SeqCst) {
            return Err(DelegantError::window(format!("{:?} rejected", command)));
        }
        tracing::debug!("[HeadlessWindow] {:?}", command);
        let mut state = self.state.lock().await;
        match command {
            WindowCommand::SetSize { width, height } => {
                state.current.width = width;
                state.current.height = height;
            }
            WindowCommand::SetPosition { x, y } => {
                state.current.x = x;
                state.current.y = y;
            }
            WindowCommand::SetAlwaysOnTop(on_top) => state.current.always_on_top = on_top,
            WindowCommand::SetDecorations(decorations) => state.current.decorations = decorations,
            WindowCommand::SetResizable(resizable) => state.current.resizable = resizable,
        }
        state.history.push(command);
        Ok(())
    }
}

impl Default for HeadlessWindow {
    fn default() -> Self {
        Self::new(Some(DisplayMetrics::FALLBACK))
    }
}

#[async_trait]
impl HostWindow for HeadlessWindow {
    async fn primary_display(&self) -> Result<Option<DisplayMetrics>> {
        Ok(self.display)
    }

    async fn set_size(&self, width: u32, height: u32) -> Result<()> {
        self.record(WindowCommand::SetSize { width, height }).await
    }

    async fn set_position(&self, x: i32, y: i32) -> Result<()> {
        self.record(WindowCommand::SetPosition { x, y }).await
    }

    async fn set_always_on_top(&self, on_top: bool) -> Result<()> {
        self.record(WindowCommand::SetAlwaysOnTop(on_top)).await
    }

    async fn set_decorations(&self, decorations: bool) -> Result<()> {
        self.record(WindowCommand::SetDecorations(decorations)).await
    }

    async fn set_resizable(&self, resizable: bool) -> Result<()> {
        self.record(WindowCommand::SetResizable(resizable)).await
    }
}
