//! Headless Chromium implementation of the page capability
//!
//! Owns one browser tab for the whole run so that cookies set during login
//! carry over to every later navigation.

use crate::page::{PageCapability, PageError, PageResult, RenderedPage};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info};

/// Poll interval used while waiting for a selector to appear
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Chromium-backed page capability
pub struct BrowserPage {
    // Dropping the Browser tears down the tab, so it rides along
    _browser: Browser,
    page: Page,
    // One tab is shared by every worker; navigation and the snapshot that
    // follows must be one atomic unit or a concurrent goto displaces the
    // document between them
    nav: tokio::sync::Mutex<()>,
}

impl BrowserPage {
    /// Launches a browser and opens the single tab used for the run
    ///
    /// Assisted login needs a visible window, so headless is a choice the
    /// caller makes, not a constant.
    pub async fn launch(headless: bool) -> PageResult<Self> {
        info!("Launching browser (headless: {})", headless);

        let mut builder = BrowserConfig::builder().args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
        ]);

        if headless {
            builder = builder.new_headless_mode();
        } else {
            builder = builder.with_head();
        }

        let config = builder
            .build()
            .map_err(|e| PageError::Browser(format!("Browser configuration failed: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| PageError::Browser(format!("Browser launch failed: {}", e)))?;
        debug!("Browser launched");

        // Drive browser events in the background
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        // Give the browser a moment to settle before opening pages
        sleep(Duration::from_millis(300)).await;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| PageError::Browser(format!("Page creation failed: {}", e)))?;

        Ok(Self {
            _browser: browser,
            page,
            nav: tokio::sync::Mutex::new(()),
        })
    }

    async fn current_url(&self) -> PageResult<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| PageError::Browser(e.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    /// Reads the tab's current document; callers hold the nav lock
    async fn render_snapshot(&self) -> PageResult<RenderedPage> {
        let url = self.current_url().await?;
        let html = self
            .page
            .content()
            .await
            .map_err(|e| PageError::Browser(e.to_string()))?;

        Ok(RenderedPage { url, html })
    }
}

#[async_trait]
impl PageCapability for BrowserPage {
    async fn goto(&self, url: &str) -> PageResult<RenderedPage> {
        let _guard = self.nav.lock().await;
        debug!("Navigating to {}", url);

        self.page
            .goto(url)
            .await
            .map_err(|e| PageError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| PageError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        self.render_snapshot().await
    }

    async fn fill(&self, selector: &str, value: &str) -> PageResult<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| PageError::MissingElement {
                selector: selector.to_string(),
            })?;

        // Click to focus before typing
        element
            .click()
            .await
            .map_err(|e| PageError::Browser(e.to_string()))?;
        element
            .type_str(value)
            .await
            .map_err(|e| PageError::Browser(e.to_string()))?;

        Ok(())
    }

    async fn click(&self, selector: &str) -> PageResult<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| PageError::MissingElement {
                selector: selector.to_string(),
            })?;

        element
            .click()
            .await
            .map_err(|e| PageError::Browser(e.to_string()))?;

        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> PageResult<()> {
        let start = Instant::now();

        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }

            if start.elapsed() > timeout {
                return Err(PageError::WaitTimeout {
                    selector: selector.to_string(),
                });
            }

            sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    async fn snapshot(&self) -> PageResult<RenderedPage> {
        let _guard = self.nav.lock().await;
        self.render_snapshot().await
    }
}
