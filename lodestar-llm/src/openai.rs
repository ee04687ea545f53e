//! OpenAI-compatible client over the shared HTTP transport.
//!
//! Talks the Responses API. The base URL is overridable so gateways and
//! wiremock servers can stand in for the real provider.

use std::time::Duration;

use async_trait::async_trait;
use lodestar_http::{Auth, HttpClient, HttpError, RequestOpts};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::traits::{LlmClient, LlmError, LlmResponse};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1/";

pub struct OpenAiClient {
    http: HttpClient,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ResponsesRequest {
    model: String,
    input: String,
    instructions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ResponsesReply {
    model: String,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl ResponsesReply {
    /// First `output_text` part across all output items, or empty.
    fn flatten_text(&self) -> String {
        self.output
            .iter()
            .flat_map(|item| &item.content)
            .find(|part| part.kind == "output_text")
            .map(|part| part.text.clone())
            .unwrap_or_default()
    }
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String) -> Result<Self, LlmError> {
        let http = HttpClient::new(OPENAI_API_BASE)
            .map_err(|e| LlmError::Config(format!("HTTP client init failed: {e}")))?;
        Ok(Self {
            http,
            api_key,
            model,
        })
    }

    /// Point the client at an OpenAI-compatible endpoint (gateways, mocks).
    pub fn with_base_url(mut self, base: &str) -> Result<Self, LlmError> {
        // Url::join drops the last path segment without a trailing slash.
        let base = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        };
        let timeout = self.http.default_timeout;
        let retries = self.http.max_retries;
        self.http = HttpClient::new(&base)
            .map_err(|e| LlmError::Config(format!("invalid endpoint {base}: {e}")))?
            .with_timeout(timeout)
            .with_retries(retries);
        Ok(self)
    }

    /// Wall-clock budget applied to every request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    /// Retry budget for transient failures (429/5xx/network).
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.http = self.http.with_retries(retries);
        self
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse, LlmError> {
        let request = ResponsesRequest {
            model: self.model.clone(),
            input: prompt.to_string(),
            instructions: system_prompt
                .unwrap_or("You are a precise assistant.")
                .to_string(),
            max_output_tokens: max_tokens,
            temperature,
        };
        let opts = RequestOpts {
            auth: Auth::Bearer(&self.api_key),
            ..Default::default()
        };

        let reply: ResponsesReply = self
            .http
            .post_json("responses", &request, opts)
            .await
            .map_err(into_llm_error)?;

        Ok(LlmResponse {
            text: reply.flatten_text(),
            model: Some(reply.model),
            tokens_used: None,
        })
    }

    async fn health_check(&self) -> Result<bool, LlmError> {
        // Listing models is cheap and never spends tokens.
        let opts = RequestOpts {
            auth: Auth::Bearer(&self.api_key),
            timeout: Some(Duration::from_secs(5)),
            ..Default::default()
        };
        match self.http.get_json::<serde_json::Value>("models", opts).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(error = %e, "OpenAI health check failed");
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn into_llm_error(e: HttpError) -> LlmError {
    match e {
        HttpError::Api { status, .. } if status == StatusCode::TOO_MANY_REQUESTS => {
            LlmError::RateLimit
        }
        HttpError::Api {
            status, message, ..
        } => LlmError::Api(format!("{status}: {message}")),
        HttpError::Url(m) | HttpError::Build(m) => LlmError::Config(m),
        HttpError::Network(m) => LlmError::Api(format!("network error: {m}")),
        HttpError::Decode(m, snippet) => {
            LlmError::Api(format!("decode error: {m}; body: {snippet}"))
        }
    }
}
