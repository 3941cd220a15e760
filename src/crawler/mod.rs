//! Crawl engine
//!
//! The frontier holds deduplicated typed requests, the dispatcher routes
//! fetched pages to their extraction handlers, and the coordinator runs the
//! bounded worker pool over both.

mod coordinator;
mod dispatcher;
mod frontier;

pub use coordinator::{Coordinator, CrawlOutcome};
pub use dispatcher::{dispatch, ExtractedPage};
pub use frontier::{CrawlRequest, FailedRequest, Frontier, PageLabel};

use crate::config::Config;
use crate::page::PageCapability;
use crate::session::LoginStrategy;
use std::sync::Arc;
use tokio::sync::watch;

/// Runs one complete crawl with the given page capability and login strategy
pub async fn crawl(
    config: Config,
    page: Arc<dyn PageCapability>,
    strategy: Box<dyn LoginStrategy>,
    shutdown: watch::Receiver<bool>,
) -> crate::Result<CrawlOutcome> {
    Coordinator::new(config, page, strategy, shutdown).run().await
}
