//! Client for a local Ollama server.
//!
//! Construction probes the server and pulls the requested model if it is not
//! installed yet, so a successfully built client is immediately usable.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::traits::{LlmClient, LlmError, LlmResponse};

const SERVER_HINT: &str =
    "no Ollama server reachable; start one with `ollama serve` (https://github.com/ollama/ollama)";

pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Deserialize)]
struct TagsReply {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

#[derive(Deserialize)]
struct GenerateReply {
    #[serde(default)]
    response: String,
    eval_count: Option<u32>,
}

impl OllamaClient {
    /// Build a client, verifying the server answers and the model exists
    /// locally (pulling it when it does not).
    pub async fn new(base_url: String, model: String) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let client = Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        };

        let installed = client.installed_models().await?;
        if !installed.iter().any(|name| name == &client.model) {
            tracing::info!(model = %client.model, "model not installed locally, pulling");
            client.pull().await?;
        }
        Ok(client)
    }

    /// Names of models the server has locally. Also serves as the liveness
    /// probe: an unreachable server maps to the install hint.
    async fn installed_models(&self) -> Result<Vec<String>, LlmError> {
        let reply = self
            .http
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|_| LlmError::Api(SERVER_HINT.to_string()))?;
        if !reply.status().is_success() {
            return Err(LlmError::Api(SERVER_HINT.to_string()));
        }
        let tags: TagsReply = reply.json().await?;
        Ok(tags.models.into_iter().map(|entry| entry.name).collect())
    }

    async fn pull(&self) -> Result<(), LlmError> {
        let reply = self
            .http
            .post(format!("{}/api/pull", self.base_url))
            .json(&json!({ "model": self.model, "stream": false }))
            .send()
            .await?;
        if !reply.status().is_success() {
            return Err(LlmError::ModelNotAvailable(format!(
                "{}: pull failed with HTTP {}",
                self.model,
                reply.status()
            )));
        }
        tracing::info!(model = %self.model, "model pulled");
        Ok(())
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse, LlmError> {
        // /api/generate has no separate system slot; fold it into the prompt.
        let input = match system_prompt {
            Some(system) => format!("{system}\n\nUser: {prompt}\n\nAssistant:"),
            None => prompt.to_string(),
        };
        let mut options = serde_json::Map::new();
        if let Some(t) = temperature {
            options.insert("temperature".into(), json!(t));
        }
        if let Some(n) = max_tokens {
            options.insert("num_predict".into(), json!(n));
        }

        let reply = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&json!({
                "model": self.model,
                "prompt": input,
                "stream": false,
                "options": options,
            }))
            .send()
            .await?;

        match reply.status() {
            reqwest::StatusCode::TOO_MANY_REQUESTS => Err(LlmError::RateLimit),
            status if !status.is_success() => {
                Err(LlmError::Api(format!("generate failed: HTTP {status}")))
            }
            _ => {
                let body: GenerateReply = reply.json().await?;
                Ok(LlmResponse {
                    text: body.response,
                    model: Some(self.model.clone()),
                    tokens_used: body.eval_count,
                })
            }
        }
    }

    async fn health_check(&self) -> Result<bool, LlmError> {
        Ok(self.installed_models().await.is_ok())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
