//! Composition root: every store and service built once and shared by `Arc`.

use std::sync::Arc;
use std::time::Duration;

use delegant_core::backend::AgentBackend;
use delegant_core::catalog::{CatalogOutcome, CatalogRequest};
use delegant_core::error::Result;
use delegant_core::event::EventSource;
use delegant_core::settings::SettingsRepository;
use delegant_core::ui::ToastSeverity;
use delegant_core::window::HostWindow;

use crate::agent_session_store::AgentSessionStore;
use crate::catalog::{CatalogEndpoints, CatalogTicket, CatalogView, ModelCatalogResolver};
use crate::event_bridge::{EventBridge, MountedBridge};
use crate::geometry::WindowGeometryController;
use crate::mode_coordinator::ModeCoordinator;
use crate::settings_store::SettingsStore;
use crate::task_launcher::TaskLauncher;
use crate::ui_store::{DEFAULT_TOAST_TTL, UiStore};

/// External collaborators the application is wired against.
#[derive(Clone)]
pub struct Collaborators {
    pub backend: Arc<dyn AgentBackend>,
    pub repository: Arc<dyn SettingsRepository>,
    pub events: Arc<dyn EventSource>,
    pub window: Arc<dyn HostWindow>,
}

/// Shown at startup on hosts without accessibility support.
pub const LINUX_ACCESSIBILITY_WARNING: &str =
    "Accessibility is not supported on Linux. Experience will be degraded.";

/// Startup warning for the host operating system, if any.
pub fn platform_warning(os: &str) -> Option<&'static str> {
    (os == "linux").then_some(LINUX_ACCESSIBILITY_WARNING)
}

#[derive(Debug, Clone)]
pub struct ContextOptions {
    pub toast_ttl: Duration,
    pub catalog_endpoints: CatalogEndpoints,
    /// Operating system name as in `std::env::consts::OS`.
    pub host_os: &'static str,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            toast_ttl: DEFAULT_TOAST_TTL,
            catalog_endpoints: CatalogEndpoints::default(),
            host_os: std::env::consts::OS,
        }
    }
}

/// A catalog query begun on a [`CatalogView`] and not yet resolved.
///
/// Holds no borrow of the view, so a newer query may begin while this one
/// is in flight; its result is then rejected by [`CatalogView::complete`].
pub struct PendingCatalog {
    ticket: CatalogTicket,
    request: CatalogRequest,
    resolver: Arc<ModelCatalogResolver>,
}

impl PendingCatalog {
    pub fn request(&self) -> &CatalogRequest {
        &self.request
    }

    pub async fn fetch(self) -> (CatalogTicket, CatalogOutcome) {
        let outcome = self.resolver.resolve(&self.request).await;
        (self.ticket, outcome)
    }
}

/// Application state shared by every view.
pub struct AppContext {
    pub settings: Arc<SettingsStore>,
    pub session: Arc<AgentSessionStore>,
    pub ui: Arc<UiStore>,
    pub geometry: Arc<WindowGeometryController>,
    pub coordinator: Arc<ModeCoordinator>,
    pub catalog: Arc<ModelCatalogResolver>,
    pub launcher: Arc<TaskLauncher>,
    pub bridge: EventBridge,
    host_os: &'static str,
}

impl AppContext {
    pub fn new(collaborators: Collaborators, options: ContextOptions) -> Result<Self> {
        let catalog = ModelCatalogResolver::standard(
            Arc::clone(&collaborators.backend),
            options.catalog_endpoints.clone(),
        )?;
        Ok(Self::with_resolver(collaborators, &options, catalog))
    }

    /// Same as [`AppContext::new`] with a caller-built resolver.
    ///
    /// `options.catalog_endpoints` is ignored.
    pub fn with_resolver(
        collaborators: Collaborators,
        options: &ContextOptions,
        catalog: ModelCatalogResolver,
    ) -> Self {
        let Collaborators {
            backend,
            repository,
            events,
            window,
        } = collaborators;

        let settings = Arc::new(SettingsStore::new(Arc::clone(&backend), repository));
        let session = Arc::new(AgentSessionStore::new());
        let ui = Arc::new(UiStore::with_toast_ttl(options.toast_ttl));
        let geometry = Arc::new(WindowGeometryController::new(window));
        let coordinator = Arc::new(ModeCoordinator::new(Arc::clone(&ui), Arc::clone(&geometry)));
        let launcher = Arc::new(TaskLauncher::new(
            Arc::clone(&settings),
            Arc::clone(&session),
            Arc::clone(&ui),
            Arc::clone(&coordinator),
            backend,
        ));
        let bridge = EventBridge::new(
            events,
            Arc::clone(&session),
            Arc::clone(&ui),
            Arc::clone(&coordinator),
        );

        Self {
            settings,
            session,
            ui,
            geometry,
            coordinator,
            catalog: Arc::new(catalog),
            launcher,
            bridge,
            host_os: options.host_os,
        }
    }

    /// Loads settings and subscribes to backend events.
    ///
    /// Also raises the platform warning toast when the host needs one.
    pub async fn start(&self) -> MountedBridge {
        if let Some(warning) = platform_warning(self.host_os) {
            self.ui.add_toast(warning, ToastSeverity::Error);
        }
        self.settings.load().await;
        let mut mounted = self.bridge.mount();
        mounted.ready().await;
        tracing::info!("[AppContext] Ready");
        mounted
    }

    /// Catalog view seeded with the selected provider's static models.
    pub fn catalog_view(&self) -> CatalogView {
        CatalogView::new(self.settings.settings().provider)
    }

    /// Prepares the setup wizard: seeds the display size from the monitor.
    pub async fn open_setup_wizard(&self) -> bool {
        self.settings
            .detect_display(self.geometry.window().as_ref())
            .await
    }

    /// Starts a catalog query for the current settings on `view`.
    ///
    /// Resolve it with [`PendingCatalog::fetch`] and hand the result back to
    /// [`CatalogView::complete`].
    pub fn begin_catalog_refresh(&self, view: &mut CatalogView) -> PendingCatalog {
        let request = self.settings.settings().catalog_request();
        PendingCatalog {
            ticket: view.begin(request.clone()),
            request,
            resolver: Arc::clone(&self.catalog),
        }
    }

    /// Begins, fetches and completes a catalog query in one call.
    ///
    /// `view` stays borrowed for the whole fetch, so nothing can supersede
    /// it. Callers that switch provider mid-flight use
    /// [`AppContext::begin_catalog_refresh`] instead.
    pub async fn refresh_catalog(&self, view: &mut CatalogView) -> Option<CatalogOutcome> {
        let pending = self.begin_catalog_refresh(view);
        let (ticket, outcome) = pending.fetch().await;
        view.complete(ticket, outcome.clone()).then_some(outcome)
    }
}
