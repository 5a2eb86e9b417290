// src/crawl/mod.rs
// =============================================================================
// This module runs a whole-site crawl.
//
// Features:
// - A single dispatcher hands URLs to a bounded pool of async workers
// - Same-host restriction (never leaves the seed's host)
// - Every page fetched at most once, even across processes sharing Redis
// - Clean termination once no URL is queued and no worker is busy
// - Optional periodic progress line
//
// Submodules:
// - orchestrator: the dispatcher, the workers and the lifecycle
// - progress: the progress line
// - report: the final summary
// =============================================================================

mod orchestrator;
mod progress;
mod report;

pub use orchestrator::{CrawlOptions, CrawlState, Crawler};
pub use report::CrawlReport;
