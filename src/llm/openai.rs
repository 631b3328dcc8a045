//! OpenAI Responses API gateway

use super::LlmGateway;
use crate::config::Settings;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

/// Gateway backed by `POST {base_url}/responses`
pub struct OpenAiGateway {
    client: Client,
    api_key: Option<SecretString>,
    model: String,
    endpoint: String,
}

impl OpenAiGateway {
    /// Create a gateway
    ///
    /// # Arguments
    /// * `api_key` - Bearer credential; calls fail with a config error without it
    /// * `model` - Model identifier sent with every request
    /// * `base_url` - API root, e.g. `https://api.openai.com/v1`
    /// * `timeout` - Per-request timeout
    pub fn new(
        api_key: Option<SecretString>,
        model: impl Into<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            model: model.into(),
            endpoint: format!("{}/responses", base_url.trim_end_matches('/')),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings
            .openai_api_key
            .as_ref()
            .map(|key| SecretString::from(key.expose_secret().to_string()));
        Self::new(
            api_key,
            settings.openai_model.clone(),
            &settings.openai_base_url,
            Duration::from_secs(settings.openai_timeout_secs),
        )
    }

    async fn send_request(&self, body: Value) -> Result<Value> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is not configured".to_string()))?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(Error::Upstream(format!(
                "API error {}: {}",
                status,
                truncate(&error_body, 500)
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("failed to parse response: {}", e)))
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let started = Instant::now();
        let body = json!({
            "model": self.model,
            "input": prompt,
        });

        let response = self.send_request(body).await.inspect_err(|e| {
            tracing::warn!(model = %self.model, error = %e, "LLM call failed");
        })?;

        let text = extract_output_text(&response)
            .ok_or_else(|| Error::Upstream("response contained no output text".to_string()))?;

        tracing::info!(
            model = %self.model,
            prompt_chars = prompt.len(),
            output_chars = text.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "LLM call completed"
        );
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

impl std::fmt::Debug for OpenAiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiGateway")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

/// Text of a Responses API body, trimmed
///
/// Prefers the convenience `output_text` field; otherwise joins every
/// `output_text` content part of the `output` items.
fn extract_output_text(body: &Value) -> Option<String> {
    if let Some(text) = body.get("output_text").and_then(Value::as_str) {
        return Some(text.trim().to_string());
    }

    let mut text = String::new();
    for item in body.get("output")?.as_array()? {
        let Some(parts) = item.get("content").and_then(Value::as_array) else {
            continue;
        };
        for part in parts {
            if part.get("type").and_then(Value::as_str) != Some("output_text") {
                continue;
            }
            if let Some(fragment) = part.get("text").and_then(Value::as_str) {
                text.push_str(fragment);
            }
        }
    }

    if text.is_empty() {
        None
    } else {
        Some(text.trim().to_string())
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}... [truncated]", &s[..idx]),
        None => s.to_string(),
    }
}
