#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use lodestar_common::observability::{init_logging, LogConfig, LogFormat};
use lodestar_common::{LodestarError, Result};
use lodestar_locate::{DocumentQuery, ElementHandle};

static TRACING: OnceLock<PathBuf> = OnceLock::new();

/// Route test logs through the shared rolling-file setup.
/// `LODESTAR_LOG_FORMAT=json` switches the encoding.
pub fn init_test_tracing() {
    let _ = TRACING.get_or_init(|| {
        let json = std::env::var("LODESTAR_LOG_FORMAT")
            .is_ok_and(|raw| raw.trim().eq_ignore_ascii_case("json"));
        init_logging(LogConfig {
            app_name: "lodestar-tests",
            emit_stderr: true,
            format: if json { LogFormat::Json } else { LogFormat::Text },
            default_filter: "debug",
            ..LogConfig::default()
        })
        .unwrap_or_default()
    });
}

/// Scripted behavior for one selector.
#[derive(Clone, Copy)]
pub enum Probe {
    /// Match immediately with this many elements.
    Matches(usize),
    /// Fail the probe with an adapter error.
    Error,
    /// Never complete within any reasonable window.
    Hang,
}

/// In-memory document whose selector outcomes are scripted per test.
///
/// Every probe is appended to `log`, so tests can assert the exact order
/// the resolver walked.
pub struct MockDocument {
    probes: HashMap<String, Probe>,
    log: Mutex<Vec<String>>,
}

impl MockDocument {
    pub fn new() -> Self {
        Self {
            probes: HashMap::new(),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, selector: &str, probe: Probe) -> Self {
        self.probes.insert(selector.to_string(), probe);
        self
    }

    /// Selectors probed so far, in order.
    pub fn probed(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, selector: &str) {
        self.log.lock().unwrap().push(selector.to_string());
    }

    async fn outcome(&self, selector: &str) -> Result<usize> {
        match self.probes.get(selector) {
            Some(Probe::Matches(n)) => Ok(*n),
            Some(Probe::Error) => Err(LodestarError::Driver(anyhow!(
                "scripted adapter failure for {selector}"
            ))),
            Some(Probe::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(0)
            }
            None => Ok(0),
        }
    }
}

/// Element handle that remembers which selector produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    pub selector: String,
}

#[async_trait]
impl ElementHandle for MockElement {
    async fn click(&self) -> Result<()> {
        Ok(())
    }

    async fn fill(&self, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn attribute(&self, _name: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn text(&self) -> Result<String> {
        Ok(String::new())
    }

    async fn is_visible(&self) -> Result<bool> {
        Ok(true)
    }

    async fn is_checked(&self) -> Result<bool> {
        Ok(false)
    }

    async fn is_enabled(&self) -> Result<bool> {
        Ok(true)
    }
}

#[async_trait]
impl DocumentQuery for MockDocument {
    type Element = MockElement;

    async fn query(&self, selector: &str) -> Result<Vec<MockElement>> {
        self.record(selector);
        let n = self.outcome(selector).await?;
        Ok((0..n)
            .map(|_| MockElement { selector: selector.to_string() })
            .collect())
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        self.record(selector);
        self.outcome(selector).await
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<MockElement> {
        self.record(selector);
        match self.outcome(selector).await? {
            // The live adapter reports an elapsed wait as a timeout.
            0 => Err(LodestarError::Timeout),
            _ => Ok(MockElement { selector: selector.to_string() }),
        }
    }
}
