//! Shared fixture: an application context wired to the in-process adapters.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use delegant_application::{AppContext, CatalogEndpoints, Collaborators, ContextOptions};
use delegant_core::window::DisplayMetrics;
use delegant_infrastructure::catalog::build_http_client;
use delegant_infrastructure::{DetachedBackend, EventHub, HeadlessWindow, TomlSettingsRepository};
use tempfile::TempDir;

pub struct Fixture {
    pub ctx: AppContext,
    pub backend: Arc<DetachedBackend>,
    pub hub: EventHub,
    pub window: Arc<HeadlessWindow>,
    pub settings_path: PathBuf,
    _dir: TempDir,
}

pub struct FixtureBuilder {
    display: Option<DisplayMetrics>,
    endpoints: CatalogEndpoints,
    settings_toml: Option<String>,
    toast_ttl: Duration,
    host_os: &'static str,
}

impl Default for FixtureBuilder {
    fn default() -> Self {
        Self {
            display: Some(DisplayMetrics::FALLBACK),
            endpoints: CatalogEndpoints::default(),
            settings_toml: None,
            toast_ttl: Duration::from_millis(4000),
            // No startup platform toast unless a test asks for one.
            host_os: "macos",
        }
    }
}

impl FixtureBuilder {
    pub fn display(mut self, display: Option<DisplayMetrics>) -> Self {
        self.display = display;
        self
    }

    pub fn endpoints(mut self, endpoints: CatalogEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn host_os(mut self, os: &'static str) -> Self {
        self.host_os = os;
        self
    }

    /// Seeds `settings.toml` with raw content before the context is built.
    pub fn settings_toml(mut self, content: &str) -> Self {
        self.settings_toml = Some(content.to_string());
        self
    }

    pub fn build(self) -> Fixture {
        let dir = TempDir::new().unwrap();
        let settings_path = dir.path().join("settings.toml");
        if let Some(content) = &self.settings_toml {
            std::fs::write(&settings_path, content).unwrap();
        }

        let backend = Arc::new(DetachedBackend::new(build_http_client().unwrap()));
        let hub = EventHub::new();
        let window = Arc::new(HeadlessWindow::new(self.display));
        let repository = Arc::new(TomlSettingsRepository::with_path(settings_path.clone()).unwrap());

        let ctx = AppContext::new(
            Collaborators {
                backend: backend.clone(),
                repository,
                events: Arc::new(hub.clone()),
                window: window.clone(),
            },
            ContextOptions {
                toast_ttl: self.toast_ttl,
                catalog_endpoints: self.endpoints,
                host_os: self.host_os,
            },
        )
        .unwrap();

        Fixture {
            ctx,
            backend,
            hub,
            window,
            settings_path,
            _dir: dir,
        }
    }
}

pub fn fixture() -> Fixture {
    FixtureBuilder::default().build()
}

/// Fixture whose saved settings already carry an Anthropic key.
pub fn configured_fixture() -> Fixture {
    FixtureBuilder::default()
        .settings_toml(
            "[settings]\nversion = \"2.0.0\"\nanthropic_api_key = \"sk-ant-test\"\nsetup_complete = true\n",
        )
        .build()
}
