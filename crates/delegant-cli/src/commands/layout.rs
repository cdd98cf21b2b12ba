use anyhow::Result;
use serde::Serialize;

use delegant_core::window::{WindowCommand, WindowGeometry, WindowLayout};

use super::utils::{Resolution, display_metrics, print_json};

#[derive(Serialize)]
struct LayoutReport {
    #[serde(flatten)]
    geometry: WindowGeometry,
    commands: Vec<WindowCommand>,
}

pub fn run(display: Option<Resolution>, scale: Option<f64>) -> Result<()> {
    let display = display_metrics(display, scale)?;

    let reports: Vec<LayoutReport> = [
        WindowLayout::Default,
        WindowLayout::Taskbar,
        WindowLayout::TaskbarExpanded,
    ]
    .into_iter()
    .map(|layout| {
        let geometry = layout.compute(&display);
        LayoutReport {
            commands: geometry.commands(),
            geometry,
        }
    })
    .collect();

    print_json(&reports)
}
