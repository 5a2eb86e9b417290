// src/crawl/orchestrator.rs
// =============================================================================
// The crawl orchestrator: one dispatcher feeding a bounded pool of workers.
//
// Lifecycle:  Seeded -> Running -> Draining -> Terminated
//
// Dispatcher loop (single task):
// 1. Pop a URL from the frontier
// 2. Count it as in flight *before* handing it to a worker
// 3. Spawn the worker once a pool slot is free
// 4. When nothing was popped: stop if no worker is in flight and the frontier
//    is empty, otherwise sleep until a worker enqueues or finishes
//
// Worker (one per URL):
// 1. Claim the URL in the visited set (a second claim is a no-op)
// 2. HEAD it; skip anything that is not HTML
// 3. GET it, normalize + scope-check every link, admit new ones
// 4. Release its in-flight slot no matter how it ended
//
// Why the in-flight counter?
// The frontier is often empty for a moment while workers are still parsing
// pages that will refill it. Stopping on "frontier empty" alone would end the
// crawl early, so we also wait until no worker holds unfinished work.
// =============================================================================

use super::progress;
use super::report::CrawlReport;
use crate::client::WebClient;
use crate::dedup::DedupSet;
use crate::error::{CrawlError, ParseError};
use crate::frontier::Frontier;
use crate::links::{domain_of, is_in_scope, normalize};
use dashmap::DashSet;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Notify, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

// How often the draining phase reports that it is still waiting
const DRAIN_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlState {
    /// Seed admitted, nothing dispatched yet
    Seeded,
    /// Dispatch loop is handing out work
    Running,
    /// No more work; waiting for submitted tasks to finish
    Draining,
    /// Everything finished, report produced
    Terminated,
}

/// Tunables for one crawl.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Size of the worker pool
    pub workers: usize,
    /// Longest the dispatcher sleeps when it has nothing to hand out
    pub idle_wait: Duration,
    /// Upper bound on the draining phase before remaining tasks are aborted
    pub drain_timeout: Duration,
    /// Emit a progress line this often, if set
    pub progress_interval: Option<Duration>,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            workers: 30,
            idle_wait: Duration::from_millis(50),
            drain_timeout: Duration::from_secs(60),
            progress_interval: None,
        }
    }
}

// State shared between the dispatcher, the workers and the progress task.
pub(super) struct Shared {
    pub(super) frontier: Arc<dyn Frontier>,
    pub(super) dedup: Arc<dyn DedupSet>,
    client: Arc<dyn WebClient>,
    scope_domain: String,
    pub(super) visited: DashSet<String>,
    failed: DashSet<String>,
    skipped: DashSet<String>,
    in_flight: AtomicUsize,
    wake: Notify,
}

impl Shared {
    // Dedup set first, frontier second: only the admission winner enqueues.
    async fn admit(&self, canonical: String) -> Result<bool, CrawlError> {
        if !self.dedup.add(&canonical).await? {
            return Ok(false);
        }
        self.frontier.enqueue(canonical).await?;
        self.wake.notify_one();
        Ok(true)
    }

    async fn visit(&self, url: String) {
        if !self.visited.insert(url.clone()) {
            debug!(url = %url, "already visited");
            return;
        }

        match self.client.probe(&url).await {
            Ok(content_type) if content_type.is_html() => {}
            Ok(content_type) => {
                debug!(url = %url, content_type = ?content_type.0, "skipping non-HTML URL");
                self.skipped.insert(url);
                return;
            }
            Err(err) => {
                warn!(url = %url, error = %err, "HEAD request failed, skipping");
                self.skipped.insert(url);
                return;
            }
        }

        let page = match self.client.fetch(&url).await {
            Ok(page) => page,
            Err(err) => {
                error!(url = %url, error = %err, "failed to crawl");
                self.failed.insert(url);
                return;
            }
        };

        let mut admitted = 0usize;
        for link in &page.links {
            if self.consider(link).await {
                admitted += 1;
            }
        }
        debug!(url = %url, links = page.links.len(), admitted, "page crawled");
    }

    // Returns true if the link was new and went onto the frontier.
    async fn consider(&self, raw: &str) -> bool {
        let canonical = match normalize(raw) {
            Ok(canonical) => canonical,
            Err(err) => {
                debug!(error = %err, "dropping link");
                return false;
            }
        };

        if !is_in_scope(&canonical, &self.scope_domain) {
            return false;
        }

        match self.admit(canonical).await {
            Ok(admitted) => admitted,
            Err(err) => {
                warn!(link = raw, error = %err, "could not admit link");
                false
            }
        }
    }
}

// Holds one unit of the in-flight count. Created on the dispatcher, dropped
// by the worker, so the count goes back down even if the worker panics.
struct InFlight {
    shared: Arc<Shared>,
}

impl InFlight {
    fn enter(shared: &Arc<Shared>) -> Self {
        shared.in_flight.fetch_add(1, Ordering::SeqCst);
        Self {
            shared: shared.clone(),
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.shared.wake.notify_one();
    }
}

pub struct Crawler {
    shared: Arc<Shared>,
    seed: String,
    options: CrawlOptions,
    state: watch::Sender<CrawlState>,
}

impl Crawler {
    /// Normalizes the seed, fixes the scope domain and admits the seed.
    ///
    /// Fails if the seed is not a crawlable URL or a backend rejects it.
    pub async fn new(
        seed_url: &str,
        frontier: Arc<dyn Frontier>,
        dedup: Arc<dyn DedupSet>,
        client: Arc<dyn WebClient>,
        options: CrawlOptions,
    ) -> Result<Self, CrawlError> {
        let seed = normalize(seed_url)?;
        let scope_domain =
            domain_of(&seed).ok_or_else(|| ParseError::MissingHost(seed_url.to_string()))?;

        let shared = Arc::new(Shared {
            frontier,
            dedup,
            client,
            scope_domain,
            visited: DashSet::new(),
            failed: DashSet::new(),
            skipped: DashSet::new(),
            in_flight: AtomicUsize::new(0),
            wake: Notify::new(),
        });

        // Another process sharing the dedup set may have admitted it already
        if !shared.admit(seed.clone()).await? {
            info!(seed = %seed, "seed already known to the dedup set");
        }

        let (state, _) = watch::channel(CrawlState::Seeded);
        Ok(Self {
            shared,
            seed,
            options,
            state,
        })
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn scope_domain(&self) -> &str {
        &self.shared.scope_domain
    }

    pub fn state(&self) -> CrawlState {
        *self.state.borrow()
    }

    /// Watch lifecycle transitions from another task.
    pub fn subscribe(&self) -> watch::Receiver<CrawlState> {
        self.state.subscribe()
    }

    pub fn in_flight(&self) -> usize {
        self.shared.in_flight.load(Ordering::SeqCst)
    }

    /// Every URL whose fetch was started, in no particular order.
    pub fn visited_urls(&self) -> Vec<String> {
        self.shared.visited.iter().map(|u| u.key().clone()).collect()
    }

    /// Runs the crawl to completion and reports what happened.
    pub async fn crawl(&self) -> Result<CrawlReport, CrawlError> {
        let started = Instant::now();
        self.state.send_replace(CrawlState::Running);
        info!(
            seed = %self.seed,
            domain = %self.shared.scope_domain,
            workers = self.options.workers,
            frontier = self.shared.frontier.kind(),
            dedup = self.shared.dedup.kind(),
            "crawl started"
        );

        let progress = self.options.progress_interval.map(|every| {
            progress::spawn(self.shared.clone(), self.state.subscribe(), every)
        });

        let pool = Arc::new(Semaphore::new(self.options.workers.max(1)));
        let mut workers = JoinSet::new();

        loop {
            while let Some(result) = workers.try_join_next() {
                log_worker_exit(result);
            }

            let next = match self.shared.frontier.dequeue().await {
                Ok(next) => next,
                Err(err) => {
                    warn!(error = %err, "frontier dequeue failed");
                    None
                }
            };

            if let Some(url) = next {
                // Must be counted here, in the same step as the dequeue,
                // never inside the worker
                let ticket = InFlight::enter(&self.shared);
                let Ok(permit) = pool.clone().acquire_owned().await else {
                    error!(url = %url, "worker pool closed while running");
                    break;
                };

                debug!(url = %url, "submitting URL");
                let shared = self.shared.clone();
                workers.spawn(async move {
                    let _permit = permit;
                    let _ticket = ticket;
                    shared.visit(url).await;
                });
                continue;
            }

            // In-flight first: a worker enqueues before it releases its slot,
            // so reading zero here means its links are already visible.
            if self.in_flight() == 0 && self.frontier_drained().await {
                break;
            }

            let _ = tokio::time::timeout(self.options.idle_wait, self.shared.wake.notified()).await;
        }

        self.drain(pool, workers).await;
        self.state.send_replace(CrawlState::Terminated);
        if let Some(handle) = progress {
            let _ = handle.await;
        }

        let report = self.report(started.elapsed()).await;
        info!(
            visited = report.visited.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            discovered = report.discovered,
            "crawling complete"
        );
        Ok(report)
    }

    async fn frontier_drained(&self) -> bool {
        match self.shared.frontier.is_empty().await {
            Ok(empty) => empty,
            Err(err) => {
                // Nothing in flight and the backend is gone: no more work can arrive
                warn!(error = %err, "cannot check frontier, treating it as empty");
                true
            }
        }
    }

    async fn drain(&self, pool: Arc<Semaphore>, mut workers: JoinSet<()>) {
        self.state.send_replace(CrawlState::Draining);
        pool.close();
        info!(remaining = workers.len(), "awaiting shutdown");

        let deadline = Instant::now() + self.options.drain_timeout;
        while !workers.is_empty() {
            match tokio::time::timeout(DRAIN_TICK, workers.join_next()).await {
                Ok(Some(result)) => log_worker_exit(result),
                Ok(None) => break,
                Err(_) if Instant::now() >= deadline => {
                    warn!(remaining = workers.len(), "drain timed out, aborting workers");
                    workers.abort_all();
                    break;
                }
                Err(_) => info!(in_flight = self.in_flight(), "waiting for crawling to complete"),
            }
        }
    }

    async fn report(&self, elapsed: Duration) -> CrawlReport {
        let shared = &self.shared;
        let mut visited: Vec<String> = shared
            .visited
            .iter()
            .map(|u| u.key().clone())
            .filter(|u| !shared.failed.contains(u) && !shared.skipped.contains(u))
            .collect();
        visited.sort();

        let mut failed: Vec<String> = shared.failed.iter().map(|u| u.key().clone()).collect();
        failed.sort();
        let mut skipped: Vec<String> = shared.skipped.iter().map(|u| u.key().clone()).collect();
        skipped.sort();

        let discovered = match shared.dedup.size().await {
            Ok(n) => n,
            Err(err) => {
                warn!(error = %err, "cannot read dedup set size");
                0
            }
        };

        CrawlReport {
            seed: self.seed.clone(),
            domain: shared.scope_domain.clone(),
            visited,
            failed,
            skipped,
            discovered,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }
}

fn log_worker_exit(result: Result<(), JoinError>) {
    if let Err(err) = result {
        if err.is_panic() {
            error!(error = %err, "crawl task panicked");
        }
    }
}
