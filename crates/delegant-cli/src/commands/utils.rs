use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;

use delegant_application::{AppContext, Collaborators, ContextOptions};
use delegant_core::settings::Settings;
use delegant_core::window::DisplayMetrics;
use delegant_infrastructure::catalog::build_http_client;
use delegant_infrastructure::{
    DelegantPaths, DetachedBackend, EventHub, HeadlessWindow, TomlSettingsRepository,
};

/// `WIDTHxHEIGHT` in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
        let width: u32 = w.trim().parse().map_err(|_| format!("bad width '{}'", w))?;
        let height: u32 = h.trim().parse().map_err(|_| format!("bad height '{}'", h))?;
        if width == 0 || height == 0 {
            return Err("width and height must be positive".to_string());
        }
        Ok(Self { width, height })
    }
}

/// Display from CLI flags; unspecified parts come from the fallback display.
pub fn display_metrics(display: Option<Resolution>, scale: Option<f64>) -> Result<DisplayMetrics> {
    let fallback = DisplayMetrics::FALLBACK;
    let scale_factor = scale.unwrap_or(fallback.scale_factor);
    if !(scale_factor.is_finite() && scale_factor > 0.0) {
        anyhow::bail!("scale factor must be a positive number, got {}", scale_factor);
    }
    Ok(match display {
        Some(r) => DisplayMetrics::new(r.width, r.height, scale_factor),
        None => DisplayMetrics::new(fallback.width, fallback.height, scale_factor),
    })
}

/// Everything a command needs, wired against the in-process adapters.
pub struct Workspace {
    pub ctx: AppContext,
    pub hub: EventHub,
    pub window: Arc<HeadlessWindow>,
}

pub fn workspace(paths: &DelegantPaths, display: DisplayMetrics) -> Result<Workspace> {
    let repository = TomlSettingsRepository::new(paths).context("Failed to open settings")?;
    tracing::debug!("Settings file: {}", repository.path().display());

    let client = build_http_client()?;
    let hub = EventHub::new();
    let window = Arc::new(HeadlessWindow::new(Some(display)));

    let ctx = AppContext::new(
        Collaborators {
            backend: Arc::new(DetachedBackend::new(client)),
            repository: Arc::new(repository),
            events: Arc::new(hub.clone()),
            window: window.clone(),
        },
        ContextOptions::default(),
    )?;

    Ok(Workspace { ctx, hub, window })
}

/// Replaces every non-empty credential with a short masked form.
pub fn masked_settings(settings: &Settings) -> Result<Value> {
    let mut value = serde_json::to_value(settings)?;
    if let Some(fields) = value.as_object_mut() {
        for (key, field) in fields.iter_mut() {
            if !key.ends_with("_api_key") {
                continue;
            }
            if let Some(secret) = field.as_str() {
                *field = Value::String(mask(secret));
            }
        }
    }
    Ok(value)
}

fn mask(secret: &str) -> String {
    let secret = secret.trim();
    if secret.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
