//! Element handle over a live WebDriver element.

use async_trait::async_trait;
use fantoccini::elements::Element;
use lodestar_common::Result;
use lodestar_locate::ElementHandle;

/// Wrapper for a resolved DOM element.
#[derive(Clone)]
pub struct WebElement {
    pub(crate) element: Element,
}

impl WebElement {
    pub(crate) fn new(element: Element) -> Self {
        Self { element }
    }

    /// The element's inner HTML, mostly useful when debugging a resolution.
    pub async fn inner_html(&self) -> Result<String> {
        Ok(self.element.html(true).await.map_err(anyhow::Error::from)?)
    }
}

#[async_trait]
impl ElementHandle for WebElement {
    async fn click(&self) -> Result<()> {
        self.element.click().await.map_err(anyhow::Error::from)?;
        Ok(())
    }

    async fn fill(&self, text: &str) -> Result<()> {
        self.element.clear().await.map_err(anyhow::Error::from)?;
        self.element
            .send_keys(text)
            .await
            .map_err(anyhow::Error::from)?;
        Ok(())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self.element.attr(name).await.map_err(anyhow::Error::from)?)
    }

    async fn text(&self) -> Result<String> {
        Ok(self.element.text().await.map_err(anyhow::Error::from)?)
    }

    async fn is_visible(&self) -> Result<bool> {
        Ok(self
            .element
            .is_displayed()
            .await
            .map_err(anyhow::Error::from)?)
    }

    async fn is_checked(&self) -> Result<bool> {
        Ok(self
            .element
            .is_selected()
            .await
            .map_err(anyhow::Error::from)?)
    }

    async fn is_enabled(&self) -> Result<bool> {
        Ok(self
            .element
            .is_enabled()
            .await
            .map_err(anyhow::Error::from)?)
    }
}
