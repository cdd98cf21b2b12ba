use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use delegant_core::catalog::{CatalogRequest, ModelCatalogEntry, ModelLister};
use delegant_core::error::{DelegantError, Result};

use super::{fetch_json, trim_base};

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<OpenAiModel>,
}

#[derive(Debug, Deserialize)]
struct OpenAiModel {
    id: String,
    #[serde(default)]
    created: i64,
}

/// Lists models from the OpenAI `/v1/models` endpoint.
///
/// OpenAI has no display names, so the label is the model id.
pub struct OpenAiModelLister {
    client: Client,
    base_url: String,
}

impl OpenAiModelLister {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com";

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
impl ModelLister for OpenAiModelLister {
    async fn list_models(&self, request: &CatalogRequest) -> Result<Vec<ModelCatalogEntry>> {
        let api_key = request
            .credential()
            .ok_or_else(|| DelegantError::config("OpenAI API key is not set"))?;

        let url = format!("{}/v1/models", trim_base(&self.base_url));
        let builder = self.client.get(url).bearer_auth(api_key);

        let mut models = fetch_json::<ModelsResponse>(builder, "OpenAI").await?.data;
        models.sort_by(|a, b| b.created.cmp(&a.created));

        Ok(models
            .into_iter()
            .map(|m| ModelCatalogEntry::new(m.id.clone(), m.id))
            .collect())
    }
}
