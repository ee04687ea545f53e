//! Page wrapper implementing the resolution core's document surface.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::Client;
use lodestar_common::LodestarError;
use lodestar_locate::{DocumentDigest, DocumentQuery};
use tracing::debug;

use crate::digest;
use crate::element::WebElement;
use crate::selector::ParsedSelector;

/// High-level handle over the document the browser currently shows.
pub struct WebPage {
    pub(crate) client: Client,
}

impl WebPage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Navigate this page's browser to `url`.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.client.goto(url).await?;
        Ok(())
    }

    pub async fn title(&self) -> Result<String> {
        Ok(self.client.title().await?)
    }

    /// Full page HTML source.
    pub async fn source(&self) -> Result<String> {
        Ok(self.client.source().await?)
    }

    pub async fn current_url(&self) -> Result<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    /// Collect the form-grouped control digest for ranking prompts.
    pub async fn digest(&self) -> Result<DocumentDigest> {
        digest::collect(&self.client).await
    }
}

#[async_trait]
impl DocumentQuery for WebPage {
    type Element = WebElement;

    async fn query(&self, selector: &str) -> lodestar_common::Result<Vec<WebElement>> {
        let parsed = ParsedSelector::parse(selector);
        let elements = self
            .client
            .find_all(parsed.locator())
            .await
            .map_err(anyhow::Error::from)?;
        debug!(
            target: "webdriver.query",
            %selector,
            matches = elements.len(),
            "queried document"
        );
        Ok(elements.into_iter().map(WebElement::new).collect())
    }

    async fn count(&self, selector: &str) -> lodestar_common::Result<usize> {
        let parsed = ParsedSelector::parse(selector);
        let elements = self
            .client
            .find_all(parsed.locator())
            .await
            .map_err(anyhow::Error::from)?;
        Ok(elements.len())
    }

    async fn wait_for(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> lodestar_common::Result<WebElement> {
        let parsed = ParsedSelector::parse(selector);
        let waited = self
            .client
            .wait()
            .at_most(timeout)
            .for_element(parsed.locator())
            .await;
        match waited {
            Ok(element) => Ok(WebElement::new(element)),
            // An elapsed wait means "no match inside the window", not a
            // broken session.
            Err(CmdError::WaitTimeout) => Err(LodestarError::Timeout),
            Err(other) => Err(anyhow::Error::from(other).into()),
        }
    }
}
