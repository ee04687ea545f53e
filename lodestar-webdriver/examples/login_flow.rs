//! Drive a login form end to end with resilient element resolution.
//!
//! Demonstrates the full wiring: load configuration, decide once at startup
//! whether LLM ranking is available (falling back to rules when it is not),
//! open a WebDriver session, fill the form through the role catalog and click
//! the login button resolved from a free-form description.
//!
//! ```text
//! chromedriver --port=9515 &
//! cargo run -p lodestar-webdriver --example login_flow -- http://localhost:8080/login
//! ```
//!
//! Reads `lodestar.yaml` from the working directory when present; every value
//! can be overridden with `LODESTAR_`-prefixed environment variables.

use std::path::Path;
use std::sync::Arc;

use lodestar_common::observability::{init_logging, LogConfig};
use lodestar_config::LodestarConfigLoader;
use lodestar_llm::ensure_llm_ready;
use lodestar_locate::{
    resolve_or_fallback, CandidateSource, Catalog, ElementHandle, RankedSource, Resolver,
    ResolverSettings, RuleSource,
};
use lodestar_webdriver::WebSession;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LogConfig {
        emit_stderr: true,
        ..LogConfig::default()
    })?;

    let login_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:8080/login".to_string());

    let mut loader = LodestarConfigLoader::new();
    if Path::new("lodestar.yaml").exists() {
        loader = loader.with_file("lodestar.yaml");
    }
    let config = loader.load()?;

    // Source selection happens exactly once, here. Resolution downstream
    // neither knows nor cares which source produced its candidates.
    let source: Arc<dyn CandidateSource> = match &config.ranker {
        Some(ranker) => match ensure_llm_ready(ranker).await {
            Ok(llm) => {
                info!(model = ranker.model(), "ranker ready");
                Arc::new(
                    RankedSource::new(llm)
                        .with_max_candidates(ranker.max_candidates())
                        .with_request_timeout(ranker.request_timeout()),
                )
            }
            Err(error) => {
                warn!(%error, "ranker unavailable, continuing rule-based");
                Arc::new(RuleSource)
            }
        },
        None => Arc::new(RuleSource),
    };

    let resolver = Resolver::new(ResolverSettings {
        budget: config.resolver.budget(),
        per_candidate_cap: config.resolver.per_candidate_cap(),
    });

    let session = WebSession::connect(&config.webdriver.url, config.webdriver.headless).await?;
    let page = session.open(&login_url).await?;

    let catalog = Catalog::new(&resolver, &page);
    let email = std::env::var("LODESTAR_DEMO_EMAIL").unwrap_or_else(|_| "user@example.com".into());
    let password = std::env::var("LODESTAR_DEMO_PASSWORD").unwrap_or_else(|_| "hunter2".into());
    catalog.email_input().await?.fill(&email).await?;
    catalog.password_input().await?.fill(&password).await?;

    // Free-form description path: candidate source plus generic fallback.
    let digest = page.digest().await.ok();
    let candidates = source.generate("login button", digest.as_ref()).await;
    let login = resolve_or_fallback(&resolver, &page, &candidates, Some("login button")).await?;
    login.click().await?;

    let landed_on = page.current_url().await?;
    info!(url = %landed_on, "login flow finished");
    session.close().await
}
