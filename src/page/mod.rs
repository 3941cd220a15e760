//! Page rendering capability
//!
//! All navigation and DOM interaction goes through the [`PageCapability`]
//! trait. The production implementation drives a headless Chromium; tests
//! substitute scripted fixtures. Extraction never touches this trait: it
//! works on the rendered HTML snapshot a fetch returns.

mod browser;

pub use browser::BrowserPage;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from the rendering capability
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Fetch timeout for {url}")]
    Timeout { url: String },

    #[error("No element matched selector '{selector}'")]
    MissingElement { selector: String },

    #[error("Timed out waiting for selector '{selector}'")]
    WaitTimeout { selector: String },

    #[error("Browser error: {0}")]
    Browser(String),
}

/// Result type for page operations
pub type PageResult<T> = std::result::Result<T, PageError>;

/// A rendered document snapshot
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// The URL the browser ended up at (after redirects)
    pub url: String,

    /// Serialized DOM after rendering
    pub html: String,
}

/// Narrow seam over the rendering engine
///
/// One instance represents one browser tab with its cookie jar; session
/// state established by a login persists across subsequent `goto` calls.
#[async_trait]
pub trait PageCapability: Send + Sync {
    /// Navigates to a URL and returns the rendered document
    async fn goto(&self, url: &str) -> PageResult<RenderedPage>;

    /// Types a value into the first element matching the selector
    async fn fill(&self, selector: &str, value: &str) -> PageResult<()>;

    /// Clicks the first element matching the selector
    async fn click(&self, selector: &str) -> PageResult<()>;

    /// Waits until the selector matches something, up to the timeout
    async fn wait_for(&self, selector: &str, timeout: Duration) -> PageResult<()>;

    /// Returns the current rendered document without navigating
    async fn snapshot(&self) -> PageResult<RenderedPage>;
}
