// src/crawl/progress.rs
// =============================================================================
// Periodic progress line while a crawl is running:
//
//   crawling [█████████---------------------] 30% (42/140 URLs, ~12 queued)
//
// scraped    = URLs a worker has started on (visited set)
// discovered = URLs ever admitted (dedup set)
//
// The task stops by itself once the crawl leaves the Running state.
// =============================================================================

use super::orchestrator::{CrawlState, Shared};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

const BAR_WIDTH: usize = 30;

pub(super) fn spawn(
    shared: Arc<Shared>,
    mut state: watch::Receiver<CrawlState>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = state.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
            if *state.borrow_and_update() != CrawlState::Running {
                break;
            }

            let scraped = shared.visited.len();
            let discovered = match shared.dedup.size().await {
                Ok(n) => n,
                Err(err) => {
                    debug!(error = %err, "progress: dedup size unavailable");
                    continue;
                }
            };
            let queued = shared
                .frontier
                .size()
                .await
                .map(|size| size.to_string())
                .unwrap_or_else(|_| "?".to_string());

            let pct = percentage(scraped, discovered);
            info!(
                "crawling [{}] {}% ({}/{} URLs, {} queued)",
                render_bar(pct),
                pct,
                scraped,
                discovered,
                queued
            );
        }
    })
}

pub fn percentage(scraped: usize, discovered: usize) -> usize {
    if discovered == 0 {
        return 0;
    }
    (scraped * 100 / discovered).min(100)
}

pub fn render_bar(pct: usize) -> String {
    let filled = pct.min(100) * BAR_WIDTH / 100;
    format!("{}{}", "█".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 4), 25);
        assert_eq!(percentage(4, 4), 100);
        // another process may have visited pages our dedup read missed
        assert_eq!(percentage(5, 4), 100);
    }

    #[test]
    fn test_render_bar() {
        assert_eq!(render_bar(0), "-".repeat(30));
        assert_eq!(render_bar(100), "█".repeat(30));
        let half = render_bar(50);
        assert_eq!(half.chars().filter(|c| *c == '█').count(), 15);
        assert_eq!(half.chars().count(), 30);
    }
}
