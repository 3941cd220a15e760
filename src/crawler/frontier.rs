//! Crawl frontier
//!
//! Queue of pending typed requests with hard URL dedup, retry bookkeeping,
//! and a terminal permanently-failed set. A URL enters the known set on
//! first enqueue and never leaves it, so the same URL is never processed
//! twice in one run.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

/// How often a blocked worker rechecks the queue while idle
const IDLE_RECHECK: Duration = Duration::from_millis(50);

/// Determines which extraction handler a fetched page gets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLabel {
    /// The course root listing lesson links
    Root,

    /// A lesson detail page with slides
    Lesson,
}

/// One unit of crawl work
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    pub url: String,
    pub label: PageLabel,

    /// Number of failed attempts so far
    pub attempt: u32,
}

/// A request that exhausted its retries
#[derive(Debug, Clone)]
pub struct FailedRequest {
    pub url: String,
    pub label: PageLabel,

    /// Total fetch attempts made (initial try plus retries)
    pub attempts: u32,

    /// Description of the last error
    pub error: String,
}

#[derive(Debug, Default)]
struct FrontierInner {
    pending: VecDeque<CrawlRequest>,
    known: HashSet<String>,
    in_flight: usize,
    succeeded: usize,
    failed: Vec<FailedRequest>,
}

/// Thread-safe frontier shared by all workers
#[derive(Debug)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
    wake: Notify,
    max_retries: u32,
    base_backoff: Duration,
}

impl Frontier {
    pub fn new(max_retries: u32, base_backoff: Duration) -> Self {
        Self {
            inner: Mutex::new(FrontierInner::default()),
            wake: Notify::new(),
            max_retries,
            base_backoff,
        }
    }

    /// Adds a request unless its URL is already known
    ///
    /// Returns whether the request was actually enqueued. Known means
    /// pending, in flight, or terminally resolved; dedup is permanent for
    /// the run.
    pub fn enqueue(&self, url: impl Into<String>, label: PageLabel) -> bool {
        let url = url.into();
        let mut inner = self.inner.lock().unwrap();

        if !inner.known.insert(url.clone()) {
            return false;
        }

        inner.pending.push_back(CrawlRequest {
            url,
            label,
            attempt: 0,
        });
        drop(inner);

        self.wake.notify_waiters();
        true
    }

    /// Yields the next pending request, or None when the crawl is drained
    ///
    /// Drained means no pending requests and nothing in flight. While other
    /// workers still hold requests this waits, since their work may enqueue
    /// more.
    pub async fn next(&self) -> Option<CrawlRequest> {
        loop {
            {
                let mut inner = self.inner.lock().unwrap();

                if let Some(request) = inner.pending.pop_front() {
                    inner.in_flight += 1;
                    return Some(request);
                }

                if inner.in_flight == 0 {
                    return None;
                }
            }

            // Bounded wait so a wakeup racing the registration cannot hang us
            let _ = tokio::time::timeout(IDLE_RECHECK, self.wake.notified()).await;
        }
    }

    /// Marks a dequeued request terminally resolved
    pub fn report_success(&self, _request: &CrawlRequest) {
        let mut inner = self.inner.lock().unwrap();
        inner.in_flight -= 1;
        inner.succeeded += 1;
        drop(inner);

        self.wake.notify_waiters();
    }

    /// Records a failed attempt
    ///
    /// Below the retry limit this returns the request to retry together
    /// with its backoff delay; the caller sleeps out the delay and then
    /// calls [`Frontier::requeue`], keeping in-flight accounting exact.
    /// At the limit the request moves to the permanently-failed set and
    /// the run continues without it.
    pub fn report_failure(
        &self,
        request: CrawlRequest,
        error: &str,
    ) -> Option<(CrawlRequest, Duration)> {
        let attempt = request.attempt + 1;

        if attempt <= self.max_retries {
            // Exponential backoff: base, 2x, 4x, ...
            let delay = self.base_backoff * 2u32.saturating_pow(attempt - 1);
            return Some((
                CrawlRequest {
                    attempt,
                    ..request
                },
                delay,
            ));
        }

        let mut inner = self.inner.lock().unwrap();
        inner.in_flight -= 1;
        inner.failed.push(FailedRequest {
            url: request.url,
            label: request.label,
            attempts: attempt,
            error: error.to_string(),
        });
        drop(inner);

        self.wake.notify_waiters();
        None
    }

    /// Returns a retry to the pending queue after its backoff
    pub fn requeue(&self, request: CrawlRequest) {
        let mut inner = self.inner.lock().unwrap();
        inner.in_flight -= 1;
        inner.pending.push_back(request);
        drop(inner);

        self.wake.notify_waiters();
    }

    /// Releases a dequeued request without resolving it (run abort)
    pub fn abandon(&self, _request: &CrawlRequest) {
        let mut inner = self.inner.lock().unwrap();
        inner.in_flight -= 1;
        drop(inner);

        self.wake.notify_waiters();
    }

    /// Requests that exhausted their retries
    pub fn failures(&self) -> Vec<FailedRequest> {
        self.inner.lock().unwrap().failed.clone()
    }

    /// Number of terminally successful requests
    pub fn succeeded(&self) -> usize {
        self.inner.lock().unwrap().succeeded
    }

    /// Number of requests waiting to be dequeued
    pub fn pending_len(&self) -> usize {
        self.inner.lock().unwrap().pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frontier() -> Frontier {
        Frontier::new(3, Duration::from_millis(100))
    }

    #[test]
    fn test_enqueue_dedups_by_url() {
        let frontier = frontier();

        assert!(frontier.enqueue("https://example.com/a", PageLabel::Lesson));
        assert!(!frontier.enqueue("https://example.com/a", PageLabel::Lesson));
        assert!(frontier.enqueue("https://example.com/b", PageLabel::Lesson));

        assert_eq!(frontier.pending_len(), 2);
    }

    #[tokio::test]
    async fn test_next_returns_requests_in_order() {
        let frontier = frontier();
        frontier.enqueue("https://example.com/root", PageLabel::Root);
        frontier.enqueue("https://example.com/l1", PageLabel::Lesson);

        let first = frontier.next().await.unwrap();
        assert_eq!(first.url, "https://example.com/root");
        assert_eq!(first.label, PageLabel::Root);
        assert_eq!(first.attempt, 0);

        let second = frontier.next().await.unwrap();
        assert_eq!(second.url, "https://example.com/l1");
    }

    #[tokio::test]
    async fn test_drained_frontier_returns_none() {
        let frontier = frontier();
        frontier.enqueue("https://example.com/a", PageLabel::Lesson);

        let request = frontier.next().await.unwrap();
        frontier.report_success(&request);

        assert!(frontier.next().await.is_none());
    }

    #[tokio::test]
    async fn test_resolved_url_cannot_reenter() {
        let frontier = frontier();
        frontier.enqueue("https://example.com/a", PageLabel::Lesson);

        let request = frontier.next().await.unwrap();
        frontier.report_success(&request);

        assert!(!frontier.enqueue("https://example.com/a", PageLabel::Lesson));
        assert!(frontier.next().await.is_none());
    }

    #[tokio::test]
    async fn test_failure_below_limit_yields_retry_with_backoff() {
        let frontier = frontier();
        frontier.enqueue("https://example.com/a", PageLabel::Lesson);

        let request = frontier.next().await.unwrap();
        let (retry, delay) = frontier.report_failure(request, "timeout").unwrap();
        assert_eq!(retry.attempt, 1);
        assert_eq!(delay, Duration::from_millis(100));

        frontier.requeue(retry);
        let request = frontier.next().await.unwrap();
        assert_eq!(request.attempt, 1);

        // Backoff doubles per attempt
        let (retry, delay) = frontier.report_failure(request, "timeout").unwrap();
        assert_eq!(delay, Duration::from_millis(200));
        frontier.requeue(retry);
    }

    #[tokio::test]
    async fn test_exhausted_retries_become_permanent_failure() {
        let frontier = Frontier::new(2, Duration::from_millis(100));
        frontier.enqueue("https://example.com/a", PageLabel::Lesson);

        let mut request = frontier.next().await.unwrap();
        for _ in 0..2 {
            let (retry, _) = frontier.report_failure(request, "timeout").unwrap();
            frontier.requeue(retry);
            request = frontier.next().await.unwrap();
        }

        // Third failure exceeds max_retries = 2
        assert!(frontier.report_failure(request, "timeout").is_none());

        let failures = frontier.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].attempts, 3);
        assert_eq!(failures[0].error, "timeout");

        // The run still drains cleanly
        assert!(frontier.next().await.is_none());
    }

    #[tokio::test]
    async fn test_worker_waits_while_others_in_flight() {
        use std::sync::Arc;

        let frontier = Arc::new(frontier());
        frontier.enqueue("https://example.com/root", PageLabel::Root);

        let request = frontier.next().await.unwrap();

        // Another worker blocks: queue is empty but work is in flight
        let waiter = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move { frontier.next().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        // Processing the root discovers a lesson; the waiter picks it up
        frontier.enqueue("https://example.com/l1", PageLabel::Lesson);
        frontier.report_success(&request);

        let picked = waiter.await.unwrap().unwrap();
        assert_eq!(picked.url, "https://example.com/l1");
    }
}
