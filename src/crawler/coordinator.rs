//! Crawl coordination
//!
//! Owns the worker pool and the shared run state. Workers pull typed
//! requests from the frontier, fetch through the session gate, dispatch to
//! the extraction handlers, and append records to the store. A fatal
//! session error or an external shutdown aborts the pool; everything
//! appended before the abort survives into the outcome.

use crate::config::Config;
use crate::crawler::dispatcher::{dispatch, ExtractedPage};
use crate::crawler::frontier::{CrawlRequest, FailedRequest, Frontier, PageLabel};
use crate::order::OrderAssigner;
use crate::page::PageCapability;
use crate::session::{LoginStrategy, SessionError, SessionGate};
use crate::store::{PhraseRecord, ResultStore};
use crate::CraneError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Everything a finished run hands back
#[derive(Debug)]
pub struct CrawlOutcome {
    /// All extracted records, sorted by (lesson_order, slide_index)
    pub records: Vec<PhraseRecord>,

    /// Pages fetched and extracted successfully
    pub pages_processed: usize,

    /// Slides that failed row-level extraction
    pub row_errors: usize,

    /// Requests that exhausted their retries
    pub permanent_failures: Vec<FailedRequest>,

    /// Whether the run stopped early on an external shutdown signal
    pub interrupted: bool,
}

/// State shared by every worker in the pool
struct Shared {
    config: Arc<Config>,
    page: Arc<dyn PageCapability>,
    gate: SessionGate,
    frontier: Frontier,
    assigner: OrderAssigner,
    store: ResultStore,
    pages_processed: AtomicUsize,
    row_errors: AtomicUsize,
    // First fatal session error; set once, aborts the whole pool
    fatal: Mutex<Option<SessionError>>,
}

/// Drives one complete crawl run
pub struct Coordinator {
    shared: Arc<Shared>,
    shutdown: watch::Receiver<bool>,
}

impl Coordinator {
    pub fn new(
        config: Config,
        page: Arc<dyn PageCapability>,
        strategy: Box<dyn LoginStrategy>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let fetch_timeout = Duration::from_secs(config.crawler.fetch_timeout_secs);
        let gate = SessionGate::new(strategy, &config.site, &config.login, fetch_timeout);
        let frontier = Frontier::new(
            config.crawler.max_retries,
            Duration::from_millis(config.crawler.retry_backoff_ms),
        );
        let assigner = OrderAssigner::new(config.crawler.slide_numbering);

        Self {
            shared: Arc::new(Shared {
                config: Arc::new(config),
                page,
                gate,
                frontier,
                assigner,
                store: ResultStore::new(),
                pages_processed: AtomicUsize::new(0),
                row_errors: AtomicUsize::new(0),
                fatal: Mutex::new(None),
            }),
            shutdown,
        }
    }

    /// Runs the crawl to completion
    ///
    /// Returns Err only on a fatal session failure; an interrupted run
    /// still yields its partial outcome so the export stage can salvage
    /// whatever was extracted before the stop.
    pub async fn run(mut self) -> crate::Result<CrawlOutcome> {
        let root_url = self.shared.config.site.root_url.clone();
        info!("Starting crawl at {}", root_url);
        self.shared.frontier.enqueue(root_url, PageLabel::Root);

        let (abort_tx, abort_rx) = watch::channel(false);
        let abort_tx = Arc::new(abort_tx);

        // Forward the external shutdown signal into the pool's abort channel
        let forwarder = {
            let abort_tx = Arc::clone(&abort_tx);
            let mut shutdown = self.shutdown.clone();
            tokio::spawn(async move {
                while shutdown.changed().await.is_ok() {
                    if *shutdown.borrow() {
                        info!("Shutdown requested, aborting crawl");
                        let _ = abort_tx.send(true);
                        break;
                    }
                }
            })
        };

        let worker_count = self.shared.config.crawler.max_concurrent_pages.max(1) as usize;
        let mut handles = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let shared = Arc::clone(&self.shared);
            let abort_rx = abort_rx.clone();
            let abort_tx = Arc::clone(&abort_tx);
            handles.push(tokio::spawn(worker(id, shared, abort_rx, abort_tx)));
        }

        for handle in handles {
            let _ = handle.await;
        }
        forwarder.abort();

        // External shutdown, not a pool-internal abort, marks interruption
        let interrupted = *self.shutdown.borrow_and_update();

        if let Some(fatal) = self.shared.fatal.lock().unwrap().take() {
            return Err(fatal.into());
        }

        let records = self.shared.store.take_sorted();
        let pages_processed = self.shared.pages_processed.load(Ordering::Relaxed);
        let row_errors = self.shared.row_errors.load(Ordering::Relaxed);
        let permanent_failures = self.shared.frontier.failures();

        info!(
            "Crawl finished: {} pages, {} records, {} row errors, {} permanent failures",
            pages_processed,
            records.len(),
            row_errors,
            permanent_failures.len()
        );

        Ok(CrawlOutcome {
            records,
            pages_processed,
            row_errors,
            permanent_failures,
            interrupted,
        })
    }
}

/// One pool worker: pull, process, repeat until drained or aborted
async fn worker(
    id: usize,
    shared: Arc<Shared>,
    mut abort: watch::Receiver<bool>,
    abort_tx: Arc<watch::Sender<bool>>,
) {
    debug!("Worker {} started", id);

    loop {
        if *abort.borrow() {
            break;
        }

        let request = tokio::select! {
            biased;
            _ = abort.changed() => break,
            next = shared.frontier.next() => match next {
                Some(request) => request,
                None => break,
            },
        };

        process(&shared, &abort_tx, request).await;
    }

    debug!("Worker {} finished", id);
}

/// Handles one dequeued request end to end, including retry bookkeeping
async fn process(shared: &Shared, abort_tx: &watch::Sender<bool>, request: CrawlRequest) {
    let url = request.url.clone();

    match handle_request(shared, &request).await {
        Ok(()) => {
            shared.frontier.report_success(&request);
            shared.pages_processed.fetch_add(1, Ordering::Relaxed);
        }
        Err(CraneError::Session(e)) => {
            error!("Fatal session failure on {}: {}", url, e);
            let mut fatal = shared.fatal.lock().unwrap();
            if fatal.is_none() {
                *fatal = Some(e);
            }
            drop(fatal);

            shared.frontier.abandon(&request);
            let _ = abort_tx.send(true);
        }
        Err(e) => {
            warn!(
                "Fetch of {} failed (attempt {}): {}",
                url,
                request.attempt + 1,
                e
            );

            match shared.frontier.report_failure(request, &e.to_string()) {
                Some((retry, delay)) => {
                    // The retry keeps its worker slot through the backoff so
                    // the frontier never looks drained while it waits
                    tokio::time::sleep(delay).await;
                    shared.frontier.requeue(retry);
                }
                None => {
                    error!("Giving up on {} after exhausting retries", url);
                }
            }
        }
    }
}

/// Fetches, dispatches, and stores the results of one request
async fn handle_request(shared: &Shared, request: &CrawlRequest) -> crate::Result<()> {
    let doc = shared.gate.fetch(shared.page.as_ref(), &request.url).await?;
    let strip = shared.config.output.strip_delimiters;

    match dispatch(request, &doc, strip)? {
        ExtractedPage::Root { lesson_links } => {
            if lesson_links.is_empty() {
                warn!(
                    "Root page {} yielded no lesson links; page layout may have changed",
                    request.url
                );
            }

            let mut enqueued = 0usize;
            for link in lesson_links {
                if shared.frontier.enqueue(link, PageLabel::Lesson) {
                    enqueued += 1;
                }
            }
            info!("Root page listed {} new lessons", enqueued);
        }
        ExtractedPage::Lesson(extract) => {
            let Some(title) = extract.title else {
                warn!(
                    "Lesson page {} has no recognizable title; skipping its slides",
                    request.url
                );
                return Ok(());
            };

            if extract.slides.is_empty() {
                warn!(
                    "Lesson page {} ('{}') has no slides; page layout may have changed",
                    request.url, title
                );
            }

            let slide_count = extract.slides.len() as u32;
            let (order, base) = shared.assigner.assign(&title, slide_count);

            let mut stored = 0usize;
            for slide in extract.slides {
                match slide {
                    Ok(slide) => {
                        shared.store.append(PhraseRecord {
                            lesson_title: title.clone(),
                            lesson_order: order,
                            slide_index: base + slide.position - 1,
                            pinyin: slide.pinyin,
                            chinese: slide.chinese,
                            translation: slide.translation,
                            notes: slide.notes,
                            audio_fast: slide.audio_fast,
                            audio_slow: slide.audio_slow,
                        });
                        stored += 1;
                    }
                    Err(e) => {
                        warn!("Row error on {}: {}", request.url, e);
                        shared.row_errors.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }

            debug!(
                "Lesson '{}' (order {}): stored {} of {} slides",
                title, order, stored, slide_count
            );
        }
    }

    Ok(())
}
