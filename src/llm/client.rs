use crate::config::ServiceConfig;
use crate::error::{AuditError, Result};
use crate::llm::types::*;
use log::{debug, info};
use reqwest::Client;
use std::time::Duration;

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuditError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// Builds a client from configuration. `None` when no API key is configured.
    pub fn from_config(config: &ServiceConfig) -> Result<Option<Self>> {
        config
            .gemini_api_key
            .clone()
            .map(|key| {
                Self::new(
                    key,
                    config.gemini_model.as_str(),
                    config.gemini_base_url.as_str(),
                    config.upstream_timeout,
                )
            })
            .transpose()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one prompt and returns the generated text. Never retries.
    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let payload = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
        };

        info!("Requesting report from {}", self.model);
        // The key rides in the query string, so keep the URL out of error messages.
        let res = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AuditError::UpstreamTransport(e.without_url()))?;
        let status = res.status();

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AuditError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateContentResponse = res
            .json()
            .await
            .map_err(|e| AuditError::UpstreamPayload(format!("Undecodable response: {e}")))?;

        let text = body.first_text().ok_or_else(|| {
            let reason = body
                .candidates
                .as_ref()
                .and_then(|c| c.first())
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "no candidates".to_string());
            AuditError::UpstreamPayload(format!("No text returned ({reason})"))
        })?;

        debug!("Received {} characters from {}", text.len(), self.model);
        Ok(text)
    }
}
