// src/frontier/local.rs
// =============================================================================
// In-process frontier backed by crossbeam's SegQueue.
//
// SegQueue is an unbounded multi-producer multi-consumer FIFO that never
// takes a lock, so workers can push while the dispatcher pops.
// dequeue() never waits: an empty queue returns None immediately.
// =============================================================================

use super::{Frontier, QueueSize};
use crate::error::CrawlError;
use async_trait::async_trait;
use crossbeam_queue::SegQueue;

#[derive(Debug, Default)]
pub struct LocalFrontier {
    queue: SegQueue<String>,
}

impl LocalFrontier {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Frontier for LocalFrontier {
    async fn enqueue(&self, url: String) -> Result<(), CrawlError> {
        self.queue.push(url);
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<String>, CrawlError> {
        Ok(self.queue.pop())
    }

    async fn is_empty(&self) -> Result<bool, CrawlError> {
        Ok(self.queue.is_empty())
    }

    async fn size(&self) -> Result<QueueSize, CrawlError> {
        Ok(QueueSize::Exact(self.queue.len()))
    }

    fn kind(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fifo_order() {
        let frontier = LocalFrontier::new();
        frontier.enqueue("http://x.com/a".to_string()).await.unwrap();
        frontier.enqueue("http://x.com/b".to_string()).await.unwrap();

        assert_eq!(frontier.size().await.unwrap(), QueueSize::Exact(2));
        assert_eq!(
            frontier.dequeue().await.unwrap().as_deref(),
            Some("http://x.com/a")
        );
        assert_eq!(
            frontier.dequeue().await.unwrap().as_deref(),
            Some("http://x.com/b")
        );
    }

    #[tokio::test]
    async fn test_empty_dequeue_returns_none_immediately() {
        let frontier = LocalFrontier::new();
        assert!(frontier.is_empty().await.unwrap());
        assert_eq!(frontier.dequeue().await.unwrap(), None);
        assert_eq!(frontier.size().await.unwrap(), QueueSize::Exact(0));
    }

    #[tokio::test]
    async fn test_concurrent_producers_lose_nothing() {
        let frontier = Arc::new(LocalFrontier::new());
        let mut handles = Vec::new();
        for worker in 0..8 {
            let frontier = frontier.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..50 {
                    frontier
                        .enqueue(format!("http://x.com/{}/{}", worker, i))
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut drained = 0;
        while frontier.dequeue().await.unwrap().is_some() {
            drained += 1;
        }
        assert_eq!(drained, 400);
        assert!(frontier.is_empty().await.unwrap());
    }
}
