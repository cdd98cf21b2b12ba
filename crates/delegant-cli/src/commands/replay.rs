use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use delegant_application::{SubmitOutcome, UiState};
use delegant_core::agent::AgentSession;
use delegant_core::event::RecordedEvent;
use delegant_core::window::WindowGeometry;
use delegant_infrastructure::{DelegantPaths, WindowSnapshot};

use super::utils::{Resolution, display_metrics, print_json, workspace};

#[derive(Serialize)]
struct ReplaySummary {
    submit: Option<SubmitOutcome>,
    events: usize,
    delivered: usize,
    session: AgentSession,
    ui: UiState,
    geometry: Option<WindowGeometry>,
    window: WindowSnapshot,
}

/// Reads a JSON Lines event recording. Blank lines and `#` comments are skipped.
fn read_events(path: &Path) -> Result<Vec<RecordedEvent>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("{}:{}: invalid event", path.display(), idx + 1))
        })
        .collect()
}

pub async fn run(
    paths: &DelegantPaths,
    events: &Path,
    task: Option<&str>,
    display: Option<Resolution>,
    scale: Option<f64>,
) -> Result<()> {
    let recorded = read_events(events)?;
    let ws = workspace(paths, display_metrics(display, scale)?)?;
    let bridge = ws.ctx.start().await;

    let submit = match task {
        Some(task) => Some(ws.ctx.launcher.submit(task).await),
        None => None,
    };

    let mut delivered = 0;
    for event in &recorded {
        delivered += ws.hub.emit(event.topic, event.payload.clone());
    }
    bridge.flush().await;
    tracing::info!("Replayed {} event(s) from {}", recorded.len(), events.display());

    let summary = ReplaySummary {
        submit,
        events: recorded.len(),
        delivered,
        session: ws.ctx.session.snapshot(),
        ui: ws.ctx.ui.snapshot(),
        geometry: ws.ctx.geometry.last_applied(),
        window: ws.window.snapshot().await,
    };
    bridge.unmount().await;

    print_json(&summary)
}
