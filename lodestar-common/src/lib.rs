//! Common types and utilities shared across Lodestar crates.
//!
//! This crate defines the shared error type, the provider-agnostic ranker
//! configuration, and observability helpers used throughout the Lodestar
//! workspace. It is intentionally lightweight so that every crate can depend
//! on it without pulling in heavy transitive costs.
//!
//! # Overview
//!
//! - [`RankerConfig`]: Provider-agnostic configuration for the candidate
//!   ranking backend
//! - [`observability`]: One-call tracing setup shared by binaries and tests
//! - [`LodestarError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! Reading tuning values off a ranker configuration:
//!
//! ```rust
//! use lodestar_common::RankerConfig;
//!
//! let cfg = RankerConfig::Openai {
//!     model: "gpt-4o-mini".into(),
//!     auth_token: "sk-test".into(),
//!     endpoint: "https://api.openai.com/v1".into(),
//!     max_candidates: None,
//!     request_timeout_ms: None,
//! };
//! assert_eq!(cfg.model(), "gpt-4o-mini");
//! assert_eq!(cfg.max_candidates(), 5);
//! ```
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod observability;

const DEFAULT_MAX_CANDIDATES: usize = 5;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 8_000;

/// Configuration for the LLM backend that ranks selector candidates.
///
/// The tag is `provider`; per-provider connection details live alongside the
/// shared tuning knobs. See the `lodestar-llm` crate for concrete client
/// implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum RankerConfig {
    Openai {
        model: String,
        auth_token: String,
        #[serde(default = "default_openai_endpoint")]
        endpoint: String,
        #[serde(default)]
        max_candidates: Option<usize>,
        #[serde(default)]
        request_timeout_ms: Option<u64>,
    },
    Ollama {
        model: String,
        #[serde(default = "default_ollama_endpoint")]
        endpoint: String,
        #[serde(default)]
        max_candidates: Option<usize>,
        #[serde(default)]
        request_timeout_ms: Option<u64>,
    },
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".into()
}
fn default_ollama_endpoint() -> String {
    "http://localhost:11434".into()
}

impl RankerConfig {
    /// Model identifier requested from the provider.
    pub fn model(&self) -> &str {
        match self {
            Self::Openai { model, .. } | Self::Ollama { model, .. } => model,
        }
    }

    /// Base endpoint of the provider API.
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Openai { endpoint, .. } | Self::Ollama { endpoint, .. } => endpoint,
        }
    }

    /// Upper bound on ranked candidates returned per request.
    pub fn max_candidates(&self) -> usize {
        match self {
            Self::Openai { max_candidates, .. } | Self::Ollama { max_candidates, .. } => {
                max_candidates.unwrap_or(DEFAULT_MAX_CANDIDATES)
            }
        }
    }

    /// Wall-clock budget for a single ranking request.
    pub fn request_timeout(&self) -> Duration {
        match self {
            Self::Openai {
                request_timeout_ms, ..
            }
            | Self::Ollama {
                request_timeout_ms, ..
            } => Duration::from_millis(request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS)),
        }
    }
}

/// Error types used across the Lodestar system.
#[derive(thiserror::Error, Debug)]
pub enum LodestarError {
    /// A driver (WebDriver session, live document, etc.) reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// A required setting was missing or rejected.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The candidate ranking backend failed or was misconfigured.
    #[error("Ranker error: {0}")]
    Ranker(String),

    /// A wait elapsed before the document produced a match.
    #[error("Timed out waiting for the document")]
    Timeout,
}

/// Convenient alias for results that use [`LodestarError`].
pub type Result<T> = std::result::Result<T, LodestarError>;
