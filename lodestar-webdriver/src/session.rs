//! WebDriver session lifecycle.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use fantoccini::ClientBuilder;
use serde_json::json;
use tracing::info;
use webdriver::capabilities::Capabilities;

use crate::page::WebPage;

/// A connected browser session. One session drives one browser.
pub struct WebSession {
    client: fantoccini::Client,
}

impl WebSession {
    /// Connect to a running WebDriver service, Chromedriver at
    /// `http://localhost:9515` being the usual one.
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self> {
        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();

        let mut args: Vec<&str> = vec!["--window-size=1280,900"];
        if headless {
            args.push("--headless");
            args.push("--disable-gpu");
        }
        chrome_opts.insert("args".to_string(), json!(args));
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await
            .map_err(|e| anyhow!("webdriver connect to {webdriver_url} failed: {e}"))?;

        info!(
            target: "webdriver.session",
            url = webdriver_url,
            headless,
            "session established"
        );

        Ok(Self { client })
    }

    /// Navigate to `url` and hand back a page to resolve against.
    pub async fn open(&self, url: &str) -> Result<WebPage> {
        self.client.goto(url).await?;
        Ok(WebPage::new(self.client.clone()))
    }

    /// Page wrapper for whatever the browser currently shows.
    pub fn current_page(&self) -> WebPage {
        WebPage::new(self.client.clone())
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}
