//! Model catalog resolution and the view state around it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use delegant_core::backend::AgentBackend;
use delegant_core::catalog::{CatalogOutcome, CatalogRequest, ModelCatalogEntry, ModelLister};
use delegant_core::error::{DelegantError, Result};
use delegant_core::settings::{DEFAULT_LOCAL_ENDPOINT, ProviderKind};
use delegant_infrastructure::catalog::{
    AnthropicModelLister, OpenAiModelLister, OpenRouterModelLister, build_http_client,
};

pub const HINT_LOADING: &str = "Loading models...";
pub const HINT_NETWORK: &str = "Network issue, check your API key or routing";
pub const HINT_EMPTY: &str = "No models found";

/// Lists local-server models through the backend command.
pub struct LocalServerLister {
    backend: Arc<dyn AgentBackend>,
}

impl LocalServerLister {
    pub fn new(backend: Arc<dyn AgentBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ModelLister for LocalServerLister {
    async fn list_models(&self, request: &CatalogRequest) -> Result<Vec<ModelCatalogEntry>> {
        let endpoint = request.endpoint.as_deref().unwrap_or(DEFAULT_LOCAL_ENDPOINT);
        self.backend
            .list_local_models(endpoint, request.credential())
            .await
    }
}

/// Base URL overrides for the cloud listers.
#[derive(Debug, Clone, Default)]
pub struct CatalogEndpoints {
    pub anthropic: Option<String>,
    pub openai: Option<String>,
    pub openrouter: Option<String>,
}

/// Dispatches catalog requests to the lister registered for each provider.
#[derive(Default)]
pub struct ModelCatalogResolver {
    listers: HashMap<ProviderKind, Arc<dyn ModelLister>>,
}

impl ModelCatalogResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver with the HTTP listers for every cloud provider and the
    /// backend-delegating lister for the local server.
    pub fn standard(backend: Arc<dyn AgentBackend>, endpoints: CatalogEndpoints) -> Result<Self> {
        let client = build_http_client()?;

        let anthropic = match endpoints.anthropic {
            Some(base) => AnthropicModelLister::with_base_url(client.clone(), base),
            None => AnthropicModelLister::new(client.clone()),
        };
        let openai = match endpoints.openai {
            Some(base) => OpenAiModelLister::with_base_url(client.clone(), base),
            None => OpenAiModelLister::new(client.clone()),
        };
        let openrouter = match endpoints.openrouter {
            Some(base) => OpenRouterModelLister::with_base_url(client, base),
            None => OpenRouterModelLister::new(client),
        };

        Ok(Self::new()
            .with_lister(ProviderKind::Anthropic, Arc::new(anthropic))
            .with_lister(ProviderKind::OpenAi, Arc::new(openai))
            .with_lister(ProviderKind::OpenRouter, Arc::new(openrouter))
            .with_lister(ProviderKind::Ollama, Arc::new(LocalServerLister::new(backend))))
    }

    pub fn register(&mut self, provider: ProviderKind, lister: Arc<dyn ModelLister>) {
        self.listers.insert(provider, lister);
    }

    pub fn with_lister(mut self, provider: ProviderKind, lister: Arc<dyn ModelLister>) -> Self {
        self.register(provider, lister);
        self
    }

    /// Resolves the live model list. Never fails: every error becomes
    /// `{ models: [], had_error: true }`.
    pub async fn resolve(&self, request: &CatalogRequest) -> CatalogOutcome {
        match self.try_resolve(request).await {
            Ok(models) => {
                tracing::debug!(
                    "[ModelCatalog] {} returned {} model(s)",
                    request.provider,
                    models.len()
                );
                CatalogOutcome::ok(models)
            }
            Err(e) => {
                tracing::warn!("[ModelCatalog] Failed to list {} models: {}", request.provider, e);
                CatalogOutcome::failed()
            }
        }
    }

    async fn try_resolve(&self, request: &CatalogRequest) -> Result<Vec<ModelCatalogEntry>> {
        let profile = request.provider.profile();
        if !profile.credential_optional && request.credential().is_none() {
            return Err(DelegantError::config(format!(
                "No {} credential configured",
                profile.label
            )));
        }

        let lister = self.listers.get(&request.provider).ok_or_else(|| {
            DelegantError::not_found("model lister", request.provider.to_string())
        })?;
        lister.list_models(request).await
    }

    /// Connection check used by the setup wizard: the query succeeded and
    /// returned at least one model.
    pub async fn test_connection(&self, request: &CatalogRequest) -> bool {
        let outcome = self.resolve(request).await;
        !outcome.had_error && !outcome.models.is_empty()
    }
}

/// Identifies one catalog query issued by a [`CatalogView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogTicket(u64);

/// Model list as shown by the task entry and settings views.
///
/// Starts from the provider's static list. Live results only land when they
/// belong to the most recent [`CatalogView::begin`].
#[derive(Debug, Clone)]
pub struct CatalogView {
    generation: u64,
    key: Option<CatalogRequest>,
    models: Vec<ModelCatalogEntry>,
    loading: bool,
    had_error: bool,
}

impl CatalogView {
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            generation: 0,
            key: None,
            models: provider.profile().static_catalog(),
            loading: false,
            had_error: false,
        }
    }

    /// Starts a query for `key`; any earlier ticket becomes stale.
    pub fn begin(&mut self, key: CatalogRequest) -> CatalogTicket {
        self.generation += 1;
        self.key = Some(key);
        self.models.clear();
        self.loading = true;
        self.had_error = false;
        CatalogTicket(self.generation)
    }

    /// Applies `outcome` if `ticket` is still current. Returns whether it was applied.
    pub fn complete(&mut self, ticket: CatalogTicket, outcome: CatalogOutcome) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!("[ModelCatalog] Dropping stale result (ticket {})", ticket.0);
            return false;
        }
        self.models = outcome.models;
        self.had_error = outcome.had_error;
        self.loading = false;
        true
    }

    /// Drops live results and goes back to the static list of `provider`.
    pub fn reset_to_static(&mut self, provider: ProviderKind) {
        *self = Self {
            generation: self.generation + 1,
            ..Self::new(provider)
        };
    }

    pub fn key(&self) -> Option<&CatalogRequest> {
        self.key.as_ref()
    }

    pub fn models(&self) -> &[ModelCatalogEntry] {
        &self.models
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn filtered(&self, query: &str) -> Vec<&ModelCatalogEntry> {
        let needle = query.trim().to_lowercase();
        self.models
            .iter()
            .filter(|m| needle.is_empty() || m.matches_lowercase(&needle))
            .collect()
    }

    /// Placeholder text when `filtered(query)` is empty.
    pub fn hint(&self, query: &str) -> Option<&'static str> {
        if self.loading {
            return Some(HINT_LOADING);
        }
        if !self.filtered(query).is_empty() {
            return None;
        }
        if self.had_error {
            Some(HINT_NETWORK)
        } else {
            Some(HINT_EMPTY)
        }
    }

    /// Display label for `model_id`, or the id itself when unknown.
    pub fn label_for(&self, model_id: &str) -> String {
        self.models
            .iter()
            .find(|m| m.id == model_id)
            .map(|m| m.label.clone())
            .unwrap_or_else(|| model_id.to_string())
    }
}
