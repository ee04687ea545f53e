//! LLM providers behind one trait, used to rank selector candidates.
//!
//! [`traits::LlmClient`] is the surface the ranking source talks to;
//! [`openai`] and [`ollama`] hold the concrete providers. [`ensure_llm_ready`]
//! turns a [`lodestar_common::RankerConfig`] into a live client or fails fast,
//! so availability is settled exactly once at startup.
//!
//! # Examples
//! ```no_run
//! use lodestar_common::RankerConfig;
//!
//! # async fn start() -> lodestar_common::Result<()> {
//! let ranker = RankerConfig::Ollama {
//!     model: "llama3.2:3b".into(),
//!     endpoint: "http://localhost:11434".into(),
//!     max_candidates: None,
//!     request_timeout_ms: None,
//! };
//! let llm = lodestar_llm::ensure_llm_ready(&ranker).await?;
//! tracing::info!(model = llm.model_name(), "candidate ranking enabled");
//! # Ok(())
//! # }
//! ```
pub mod ollama;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use lodestar_common::{LodestarError, RankerConfig};
use ollama::OllamaClient;
use openai::OpenAiClient;
use traits::LlmClient;

/// Validate configuration and construct a ready ranking client.
///
/// Fails fast when credentials are missing or the provider is unreachable, so
/// callers decide exactly once at startup whether ranking is available; no
/// per-call availability probing happens afterwards.
pub async fn ensure_llm_ready(
    config: &RankerConfig,
) -> lodestar_common::Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    match config {
        RankerConfig::Openai {
            model,
            auth_token,
            endpoint,
            ..
        } => {
            if auth_token.trim().is_empty() {
                return Err(LodestarError::Config(
                    "ranker auth_token is empty; drop the ranker section to run rule-based only"
                        .to_string(),
                ));
            }
            let client = OpenAiClient::new(auth_token.clone(), model.clone())
                .and_then(|c| c.with_base_url(endpoint))
                .map_err(|e| LodestarError::Ranker(e.to_string()))?
                .with_timeout(config.request_timeout());
            Ok(Arc::new(client))
        }
        RankerConfig::Ollama {
            model, endpoint, ..
        } => {
            let client = OllamaClient::new(endpoint.clone(), model.clone())
                .await
                .map_err(|e| LodestarError::Ranker(e.to_string()))?;
            Ok(Arc::new(client))
        }
    }
}
