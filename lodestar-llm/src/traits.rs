use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One completion as handed back by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    /// Model that actually served the request, when the provider reports it.
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("model not available: {0}")]
    ModelNotAvailable(String),

    #[error("rate limit exceeded")]
    RateLimit,

    #[error("configuration error: {0}")]
    Config(String),
}

/// Completion interface the candidate ranker consumes. Implementations are
/// constructed up front (see `ensure_llm_ready`), so every method can assume
/// a validated endpoint and model.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One-shot completion for `prompt`, optionally steered by a system
    /// prompt, a token ceiling, and a sampling temperature.
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse, LlmError>;

    /// Cheap liveness probe; never spends tokens.
    async fn health_check(&self) -> Result<bool, LlmError>;

    fn model_name(&self) -> &str;
}
