//! HTTP model listers for the cloud providers.
//!
//! Each lister issues exactly one `GET` and maps the provider's model list to
//! catalog entries, newest first. Base URLs are injectable so tests can point
//! them at a mock server.

mod anthropic;
mod openai;
mod openrouter;

pub use anthropic::AnthropicModelLister;
pub use openai::OpenAiModelLister;
pub use openrouter::OpenRouterModelLister;

use std::time::Duration;

use delegant_core::error::{DelegantError, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Builds the HTTP client shared by every lister.
pub fn build_http_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| DelegantError::network(format!("Failed to build HTTP client: {}", e)))
}

/// Sends `request` and decodes a JSON body, mapping every failure to a
/// network error.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    provider: &str,
) -> Result<T> {
    let response = request.send().await.map_err(|err| {
        DelegantError::network(format!("{} model list request failed: {}", provider, err))
    })?;

    let status = response.status();
    if !status.is_success() {
        let body_text = response
            .text()
            .await
            .unwrap_or_else(|_| format!("Failed to read {} error body", provider));
        return Err(DelegantError::http_status(
            status.as_u16(),
            format!("{} model list failed: {}", provider, truncate(&body_text, 200)),
        ));
    }

    response.json::<T>().await.map_err(|err| {
        DelegantError::network(format!("Failed to parse {} model list: {}", provider, err))
    })
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub(crate) fn trim_base(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
