use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::Deserialize;

use delegant_core::catalog::{CatalogRequest, ModelCatalogEntry, ModelLister};
use delegant_core::error::{DelegantError, Result};

use super::{fetch_json, trim_base};

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<AnthropicModel>,
}

#[derive(Debug, Deserialize)]
struct AnthropicModel {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl AnthropicModel {
    fn created(&self) -> Option<DateTime<FixedOffset>> {
        self.created_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
    }
}

/// Lists models from the Anthropic `/v1/models` endpoint.
pub struct AnthropicModelLister {
    client: Client,
    base_url: String,
}

impl AnthropicModelLister {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com";

    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, Self::DEFAULT_BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ModelLister for AnthropicModelLister {
    async fn list_models(&self, request: &CatalogRequest) -> Result<Vec<ModelCatalogEntry>> {
        let api_key = request
            .credential()
            .ok_or_else(|| DelegantError::config("Anthropic API key is not set"))?;

        let url = format!("{}/v1/models", trim_base(&self.base_url));
        let builder = self
            .client
            .get(url)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION);

        let mut models = fetch_json::<ModelsResponse>(builder, "Anthropic").await?.data;

        // RFC 3339 instants compare chronologically; unparseable ones sort last.
        models.sort_by(|a, b| {
            b.created()
                .cmp(&a.created())
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        Ok(models
            .into_iter()
            .map(|m| {
                let label = m.display_name.unwrap_or_else(|| m.id.clone());
                ModelCatalogEntry::new(m.id, label)
            })
            .collect())
    }
}
