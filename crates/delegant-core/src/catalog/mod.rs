//! Model catalog types and the per-provider lister trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::settings::ProviderKind;

/// One selectable model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCatalogEntry {
    pub id: String,
    pub label: String,
}

impl ModelCatalogEntry {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    /// Case-insensitive substring match on id or label.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.id.to_lowercase().contains(needle) || self.label.to_lowercase().contains(needle)
    }
}

/// Result of one catalog resolution.
///
/// A failed query is `{ models: [], had_error: true }`; an empty but
/// successful query is `{ models: [], had_error: false }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogOutcome {
    pub models: Vec<ModelCatalogEntry>,
    pub had_error: bool,
}

impl CatalogOutcome {
    pub fn ok(models: Vec<ModelCatalogEntry>) -> Self {
        Self {
            models,
            had_error: false,
        }
    }

    pub fn failed() -> Self {
        Self {
            models: Vec::new(),
            had_error: true,
        }
    }
}

/// Input of one catalog resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogRequest {
    pub provider: ProviderKind,
    pub credential: String,
    /// Normalized endpoint; only set for the local provider.
    pub endpoint: Option<String>,
}

impl CatalogRequest {
    /// Credential, or `None` when empty or whitespace-only.
    pub fn credential(&self) -> Option<&str> {
        let trimmed = self.credential.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Fetches the live model list of a single provider.
///
/// Implementations issue exactly one request and return the models newest
/// first. Any non-success response is an error.
#[async_trait]
pub trait ModelLister: Send + Sync {
    async fn list_models(&self, request: &CatalogRequest) -> Result<Vec<ModelCatalogEntry>>;
}
