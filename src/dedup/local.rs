// src/dedup/local.rs
// =============================================================================
// In-process dedup set backed by DashSet.
//
// DashSet shards its contents behind per-shard locks, and insert() reports
// whether the value was new while holding that shard's lock. That makes
// insert() the atomic admission primitive we need.
// =============================================================================

use super::DedupSet;
use crate::error::CrawlError;
use async_trait::async_trait;
use dashmap::DashSet;

#[derive(Debug, Default)]
pub struct LocalDedupSet {
    urls: DashSet<String>,
}

impl LocalDedupSet {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DedupSet for LocalDedupSet {
    async fn contains(&self, url: &str) -> Result<bool, CrawlError> {
        Ok(self.urls.contains(url))
    }

    async fn add(&self, url: &str) -> Result<bool, CrawlError> {
        Ok(self.urls.insert(url.to_string()))
    }

    async fn size(&self) -> Result<usize, CrawlError> {
        Ok(self.urls.len())
    }

    fn kind(&self) -> &'static str {
        "in-memory"
    }
}
