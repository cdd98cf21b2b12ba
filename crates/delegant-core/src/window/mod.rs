//! Window layouts and the host window abstraction.
//!
//! Geometry is a pure function of the UI mode state and the current primary
//! display; [`WindowGeometry::commands`] yields the ordered primitive calls a
//! controller issues against a [`HostWindow`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::error::Result;
use crate::ui::{UiMode, UiModeState};

const DEFAULT_SIZE: (u32, u32) = (1400, 900);
const TASKBAR_SIZE: (u32, u32) = (420, 52);
const TASKBAR_EXPANDED_SIZE: (u32, u32) = (420, 380);
/// Gap between the taskbar's bottom edge and the display bottom, in physical pixels.
pub const TASKBAR_BOTTOM_MARGIN: i64 = 60;

/// Physical size and scale of a display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayMetrics {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

impl DisplayMetrics {
    /// Used when the host reports no display.
    pub const FALLBACK: DisplayMetrics = DisplayMetrics {
        width: 1920,
        height: 1080,
        scale_factor: 1.0,
    };

    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            width,
            height,
            scale_factor,
        }
    }
}

impl Default for DisplayMetrics {
    fn default() -> Self {
        Self::FALLBACK
    }
}

/// The three window shapes the app can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WindowLayout {
    /// Centered, decorated, resizable start window.
    Default,
    /// Compact always-on-top bar above the system taskbar.
    Taskbar,
    /// Taskbar grown upward, same bottom edge.
    TaskbarExpanded,
}

impl WindowLayout {
    pub fn for_state(state: &UiModeState) -> Self {
        match (state.mode, state.expanded) {
            (UiMode::Start, _) => WindowLayout::Default,
            (UiMode::Taskbar, false) => WindowLayout::Taskbar,
            (UiMode::Taskbar, true) => WindowLayout::TaskbarExpanded,
        }
    }

    /// Size in logical pixels.
    pub fn logical_size(self) -> (u32, u32) {
        match self {
            WindowLayout::Default => DEFAULT_SIZE,
            WindowLayout::Taskbar => TASKBAR_SIZE,
            WindowLayout::TaskbarExpanded => TASKBAR_EXPANDED_SIZE,
        }
    }

    fn is_taskbar(self) -> bool {
        !matches!(self, WindowLayout::Default)
    }

    /// Computes the physical geometry on `display`.
    pub fn compute(self, display: &DisplayMetrics) -> WindowGeometry {
        let (logical_w, logical_h) = self.logical_size();
        let width = round_half_up(f64::from(logical_w) * display.scale_factor).max(0) as u32;
        let height = round_half_up(f64::from(logical_h) * display.scale_factor).max(0) as u32;

        let screen_w = i64::from(display.width);
        let screen_h = i64::from(display.height);
        let x = round_half_up((screen_w - i64::from(width)) as f64 / 2.0);
        let y = if self.is_taskbar() {
            screen_h - i64::from(height) - TASKBAR_BOTTOM_MARGIN
        } else {
            round_half_up((screen_h - i64::from(height)) as f64 / 2.0)
        };

        let taskbar = self.is_taskbar();
        WindowGeometry {
            layout: self,
            width,
            height,
            x: clamp_i32(x),
            y: clamp_i32(y),
            always_on_top: taskbar,
            decorations: !taskbar,
            resizable: !taskbar,
        }
    }
}

/// Rounds like a UI toolkit does: halves go toward positive infinity.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Concrete physical placement and window flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub layout: WindowLayout,
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    pub always_on_top: bool,
    pub decorations: bool,
    pub resizable: bool,
}

/// One host window primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WindowCommand {
    SetSize { width: u32, height: u32 },
    SetPosition { x: i32, y: i32 },
    SetAlwaysOnTop(bool),
    SetDecorations(bool),
    SetResizable(bool),
}

impl WindowGeometry {
    /// Primitive calls in application order.
    ///
    /// The default layout drops the taskbar flags before resizing so the
    /// window is never large and undecorated at once; taskbar layouts shrink
    /// first and then pin.
    pub fn commands(&self) -> Vec<WindowCommand> {
        let size = WindowCommand::SetSize {
            width: self.width,
            height: self.height,
        };
        let position = WindowCommand::SetPosition {
            x: self.x,
            y: self.y,
        };
        let flags = [
            WindowCommand::SetAlwaysOnTop(self.always_on_top),
            WindowCommand::SetDecorations(self.decorations),
            WindowCommand::SetResizable(self.resizable),
        ];

        if self.layout.is_taskbar() {
            let mut commands = vec![size, position];
            commands.extend(flags);
            commands
        } else {
            let mut commands = flags.to_vec();
            commands.extend([size, position]);
            commands
        }
    }
}

/// Native window primitives of the host toolkit.
#[async_trait]
pub trait HostWindow: Send + Sync {
    /// Metrics of the display the window lives on, if known.
    async fn primary_display(&self) -> Result<Option<DisplayMetrics>>;
    async fn set_size(&self, width: u32, height: u32) -> Result<()>;
    async fn set_position(&self, x: i32, y: i32) -> Result<()>;
    async fn set_always_on_top(&self, on_top: bool) -> Result<()>;
    async fn set_decorations(&self, decorations: bool) -> Result<()>;
    async fn set_resizable(&self, resizable: bool) -> Result<()>;

    /// Dispatches a single primitive.
    async fn apply(&self, command: WindowCommand) -> Result<()> {
        match command {
            WindowCommand::SetSize { width, height } => self.set_size(width, height).await,
            WindowCommand::SetPosition { x, y } => self.set_position(x, y).await,
            WindowCommand::SetAlwaysOnTop(on_top) => self.set_always_on_top(on_top).await,
            WindowCommand::SetDecorations(decorations) => self.set_decorations(decorations).await,
            WindowCommand::SetResizable(resizable) => self.set_resizable(resizable).await,
        }
    }
}
