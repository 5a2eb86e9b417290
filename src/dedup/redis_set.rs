// src/dedup/redis_set.rs
// =============================================================================
// Distributed dedup set backed by a Redis set.
//
// SADD returns how many members were actually added, which is exactly the
// "was it new?" answer, computed atomically on the server. Every crawler
// process pointing at the same key shares one admission set, which is what
// lets several processes crawl the same site without fetching a page twice.
// =============================================================================

use super::DedupSet;
use crate::error::CrawlError;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

const BACKEND: &str = "redis dedup set";

pub struct RedisDedupSet {
    con: MultiplexedConnection,
    key: String,
}

impl RedisDedupSet {
    pub async fn connect(redis_url: &str, key: &str) -> Result<Self, CrawlError> {
        let unavailable = |source| CrawlError::BackendUnavailable {
            backend: BACKEND,
            source,
        };

        let client = redis::Client::open(redis_url).map_err(unavailable)?;
        let mut con = client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)?;

        // Fail now rather than on the first admission
        let _: String = redis::cmd("PING")
            .query_async(&mut con)
            .await
            .map_err(unavailable)?;

        Ok(Self {
            con,
            key: key.to_string(),
        })
    }
}

#[async_trait]
impl DedupSet for RedisDedupSet {
    async fn contains(&self, url: &str) -> Result<bool, CrawlError> {
        let mut con = self.con.clone();
        con.sismember(&self.key, url).await.map_err(backend_error)
    }

    async fn add(&self, url: &str) -> Result<bool, CrawlError> {
        let mut con = self.con.clone();
        let added: usize = con.sadd(&self.key, url).await.map_err(backend_error)?;
        Ok(added > 0)
    }

    async fn size(&self) -> Result<usize, CrawlError> {
        let mut con = self.con.clone();
        con.scard(&self.key).await.map_err(backend_error)
    }

    fn kind(&self) -> &'static str {
        "redis"
    }
}

fn backend_error(source: redis::RedisError) -> CrawlError {
    CrawlError::Backend {
        backend: BACKEND,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_redis_is_backend_unavailable() {
        let result = RedisDedupSet::connect("redis://127.0.0.1:1/", "cache").await;
        assert!(matches!(
            result,
            Err(CrawlError::BackendUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_redis_url_is_backend_unavailable() {
        let result = RedisDedupSet::connect("not-a-redis-url", "cache").await;
        assert!(matches!(
            result,
            Err(CrawlError::BackendUnavailable { .. })
        ));
    }
}
