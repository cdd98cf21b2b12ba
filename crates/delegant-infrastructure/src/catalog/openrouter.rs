use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use delegant_core::catalog::{CatalogRequest, ModelCatalogEntry, ModelLister};
use delegant_core::error::Result;

use super::{fetch_json, trim_base};

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<OpenRouterModel>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterModel {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    created: i64,
}

/// Lists models from the OpenRouter `/api/v1/models` endpoint.
///
/// The endpoint is public; the key is sent only when present.
pub struct OpenRouterModelLister {
    client: Client,
    base_url: String,
}

impl OpenRouterModelLister {
    pub const DEFAULT_BASE_URL: &'static str = "https://openrouter.ai";

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
impl ModelLister for OpenRouterModelLister {
    async fn list_models(&self, request: &CatalogRequest) -> Result<Vec<ModelCatalogEntry>> {
        let url = format!("{}/api/v1/models", trim_base(&self.base_url));
        let mut builder = self.client.get(url);
        if let Some(api_key) = request.credential() {
            builder = builder.bearer_auth(api_key);
        }

        let mut models = fetch_json::<ModelsResponse>(builder, "OpenRouter").await?.data;
        models.sort_by(|a, b| b.created.cmp(&a.created));

        Ok(models
            .into_iter()
            .map(|m| {
                let label = m.name.unwrap_or_else(|| m.id.clone());
                ModelCatalogEntry::new(m.id, label)
            })
            .collect())
    }
}
