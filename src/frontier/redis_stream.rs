// src/frontier/redis_stream.rs
// =============================================================================
// Distributed frontier backed by a Redis Stream (Redis 6.2 or newer).
//
// How it works:
// - enqueue: XADD the URL to the stream
// - dequeue: XREADGROUP one new entry for this process's consumer, blocking
//   for at most the poll interval. If nothing new arrives, XAUTOCLAIM one
//   entry that some consumer read but never acknowledged. Either way XACK it
//   and hand the URL over.
// - size:    read from the consumer group itself (XINFO GROUPS / STREAM):
//   pending entries plus entries not yet delivered to any consumer
//
// Every crawler process joins the same consumer group, so each entry is
// handed to exactly one of them. An entry read by a process that died before
// acknowledging it stays in the group's pending list until it has been idle
// for CLAIM_IDLE, then the next consumer with nothing new to read takes it.
//
// The blocking XREADGROUP runs on its own connection. Redis answers commands
// on one connection in order, so sharing it would hold every worker's XADD
// until the read returned.
// =============================================================================

use super::{Frontier, QueueSize};
use crate::error::CrawlError;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::streams::{StreamReadOptions, StreamReadReply};
use redis::{AsyncCommands, ErrorKind, FromRedisValue, RedisResult, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

const BACKEND: &str = "redis frontier";
const GROUP: &str = "site-crawler";
const URL_FIELD: &str = "url";

// Consumers acknowledge right after reading, so an entry idle this long
// belongs to a consumer that is gone.
const CLAIM_IDLE: Duration = Duration::from_secs(30);

pub struct RedisFrontier {
    con: MultiplexedConnection,
    reader: MultiplexedConnection,
    stream_key: String,
    consumer: String,
    poll: Duration,
}

impl RedisFrontier {
    /// Connects to Redis and joins (or creates) the consumer group.
    ///
    /// Any failure here is `BackendUnavailable`: the crawl cannot start.
    pub async fn connect(
        redis_url: &str,
        stream_key: &str,
        poll: Duration,
    ) -> Result<Self, CrawlError> {
        let unavailable = |source| CrawlError::BackendUnavailable {
            backend: BACKEND,
            source,
        };

        let client = redis::Client::open(redis_url).map_err(unavailable)?;
        let mut con = client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)?;
        let reader = client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)?;

        // "0" so a freshly created group also sees entries published earlier
        let created: RedisResult<()> = con.xgroup_create_mkstream(stream_key, GROUP, "0").await;
        match created {
            Ok(()) => debug!(stream = stream_key, group = GROUP, "created consumer group"),
            Err(e) if e.code() == Some("BUSYGROUP") => {}
            Err(e) => return Err(unavailable(e)),
        }

        Ok(Self {
            con,
            reader,
            stream_key: stream_key.to_string(),
            consumer: format!("crawler-{}", std::process::id()),
            poll,
        })
    }

    async fn read_new(&self) -> Result<Option<(String, Option<String>)>, CrawlError> {
        let mut reader = self.reader.clone();
        let options = StreamReadOptions::default()
            .group(GROUP, &self.consumer)
            .count(1)
            .block(self.poll.as_millis() as usize);

        let reply: Option<StreamReadReply> = reader
            .xread_options(&[&self.stream_key], &[">"], &options)
            .await
            .map_err(backend_error)?;

        Ok(reply
            .into_iter()
            .flat_map(|r| r.keys)
            .flat_map(|k| k.ids)
            .next()
            .map(|entry| {
                let url: Option<String> = entry.get(URL_FIELD);
                (entry.id, url)
            }))
    }

    async fn claim_stale(&self) -> Result<Option<(String, Option<String>)>, CrawlError> {
        let mut con = self.con.clone();
        let reply: Vec<Value> = redis::cmd("XAUTOCLAIM")
            .arg(&self.stream_key)
            .arg(GROUP)
            .arg(&self.consumer)
            .arg(CLAIM_IDLE.as_millis() as u64)
            .arg("0-0")
            .arg("COUNT")
            .arg(1)
            .query_async(&mut con)
            .await
            .map_err(backend_error)?;

        let claimed = first_claimed(&reply).map_err(backend_error)?;
        if let Some((id, _)) = &claimed {
            debug!(id = %id, "claimed stale stream entry");
        }
        Ok(claimed)
    }
}

#[async_trait]
impl Frontier for RedisFrontier {
    async fn enqueue(&self, url: String) -> Result<(), CrawlError> {
        let mut con = self.con.clone();
        let _: String = con
            .xadd(&self.stream_key, "*", &[(URL_FIELD, url.as_str())])
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<String>, CrawlError> {
        let entry = match self.read_new().await? {
            Some(entry) => Some(entry),
            None => self.claim_stale().await?,
        };
        let Some((id, url)) = entry else {
            return Ok(None);
        };

        // The URL is already in our hands. If the ack is lost the entry
        // stays pending and gets claimed again later.
        let mut con = self.con.clone();
        let acked: RedisResult<usize> = con.xack(&self.stream_key, GROUP, &[&id]).await;
        if let Err(err) = acked {
            warn!(id = %id, error = %err, "cannot acknowledge stream entry");
        }

        if url.is_none() {
            debug!(id = %id, "stream entry without a url field");
        }
        Ok(url)
    }

    async fn is_empty(&self) -> Result<bool, CrawlError> {
        Ok(self.size().await? == QueueSize::Approximate(0))
    }

    async fn size(&self) -> Result<QueueSize, CrawlError> {
        let mut con = self.con.clone();
        let (groups, stream): (Vec<HashMap<String, Value>>, HashMap<String, Value>) =
            redis::pipe()
                .atomic()
                .cmd("XINFO")
                .arg("GROUPS")
                .arg(&self.stream_key)
                .cmd("XINFO")
                .arg("STREAM")
                .arg(&self.stream_key)
                .query_async(&mut con)
                .await
                .map_err(backend_error)?;

        let group = find_group(&groups).map_err(backend_error)?;
        let last_generated: String = field(&stream, "last-generated-id").map_err(backend_error)?;
        Ok(queue_size(&group, &last_generated))
    }

    fn kind(&self) -> &'static str {
        "redis-stream"
    }
}

fn backend_error(source: redis::RedisError) -> CrawlError {
    CrawlError::Backend {
        backend: BACKEND,
        source,
    }
}

// What XINFO GROUPS says about our consumer group
#[derive(Debug, Clone, PartialEq, Eq)]
struct GroupInfo {
    pending: usize,
    last_delivered_id: String,
    // Redis 7+ only, and nil when the server cannot work it out
    lag: Option<usize>,
}

fn field<T: FromRedisValue>(fields: &HashMap<String, Value>, name: &str) -> RedisResult<T> {
    redis::from_redis_value(fields.get(name).unwrap_or(&Value::Nil))
}

fn find_group(groups: &[HashMap<String, Value>]) -> RedisResult<GroupInfo> {
    for fields in groups {
        let name: String = field(fields, "name")?;
        if name == GROUP {
            return Ok(GroupInfo {
                pending: field(fields, "pending")?,
                last_delivered_id: field(fields, "last-delivered-id")?,
                lag: field(fields, "lag")?,
            });
        }
    }
    Err((ErrorKind::TypeError, "consumer group not found").into())
}

// Pending entries always count. Undelivered ones are visible through the
// ids: the group has caught up when its last delivered id is the stream's
// last generated id. Behind, without a lag figure, the size is unknown and
// the frontier is not empty.
fn queue_size(group: &GroupInfo, last_generated_id: &str) -> QueueSize {
    if group.last_delivered_id == last_generated_id {
        return QueueSize::Approximate(group.pending);
    }
    match group.lag {
        Some(lag) => QueueSize::Approximate(group.pending + lag.max(1)),
        None => QueueSize::Unknown,
    }
}

// XAUTOCLAIM answers [next-start-id, [[id, [field, value, ...]], ...], ...].
// An entry deleted from the stream comes back with nil fields on Redis 6.2.
fn first_claimed(reply: &[Value]) -> RedisResult<Option<(String, Option<String>)>> {
    let Some(entries) = reply.get(1) else {
        return Ok(None);
    };
    let entries: Vec<Value> = redis::from_redis_value(entries)?;
    let Some(first) = entries.first() else {
        return Ok(None);
    };
    let (id, fields): (String, Option<HashMap<String, String>>) = redis::from_redis_value(first)?;
    Ok(Some((id, fields.and_then(|mut f| f.remove(URL_FIELD)))))
}
