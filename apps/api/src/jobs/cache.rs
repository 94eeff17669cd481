//! Read-through cache for the favorites / applied lists.
//!
//! The database is authoritative. Every mutation for a user drops both of that
//! user's cached lists, and cache failures only ever cost a database read.
//!
//! Each user also has a generation counter that `invalidate` bumps. A reader
//! samples it before going to the database and hands it back to `put`. The
//! entry is only stored if no invalidation happened in between, so a slow
//! read can never re-cache a list that a concurrent write already replaced.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::{AsyncCommands, Script};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::job::{JobFlag, JobRecord};

#[async_trait]
pub trait RecordCache: Send + Sync {
    async fn get(&self, user_id: Uuid, flag: JobFlag) -> Option<Vec<JobRecord>>;

    /// Current generation of the user's lists, or `None` when it cannot be
    /// read (the caller then skips caching).
    async fn generation(&self, user_id: Uuid) -> Option<u64>;

    /// Stores `records` unless the user's generation has moved past `generation`.
    async fn put(&self, user_id: Uuid, flag: JobFlag, records: &[JobRecord], generation: u64);

    async fn invalidate(&self, user_id: Uuid);
}

/// SET with expiry, only while the generation key still holds ARGV[1].
static PUT_IF_CURRENT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r"
        local current = tonumber(redis.call('GET', KEYS[1]) or '0')
        if current ~= tonumber(ARGV[1]) then
            return 0
        end
        redis.call('SET', KEYS[2], ARGV[2], 'EX', ARGV[3])
        return 1
        ",
    )
});

/// Used when no `REDIS_URL` is configured.
pub struct NoopRecordCache;

#[async_trait]
impl RecordCache for NoopRecordCache {
    async fn get(&self, _user_id: Uuid, _flag: JobFlag) -> Option<Vec<JobRecord>> {
        None
    }

    async fn generation(&self, _user_id: Uuid) -> Option<u64> {
        None
    }

    async fn put(
        &self,
        _user_id: Uuid,
        _flag: JobFlag,
        _records: &[JobRecord],
        _generation: u64,
    ) {
    }

    async fn invalidate(&self, _user_id: Uuid) {}
}

pub struct RedisRecordCache {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisRecordCache {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    async fn connection(&self) -> redis::RedisResult<redis::aio::MultiplexedConnection> {
        self.client.get_multiplexed_async_connection().await
    }

    async fn try_get(&self, key: &str) -> redis::RedisResult<Option<String>> {
        let mut con = self.connection().await?;
        con.get(key).await
    }

    async fn try_generation(&self, user_id: Uuid) -> redis::RedisResult<u64> {
        let mut con = self.connection().await?;
        let current: Option<u64> = con.get(generation_key(user_id)).await?;
        Ok(current.unwrap_or(0))
    }

    async fn try_put(
        &self,
        user_id: Uuid,
        key: &str,
        payload: String,
        generation: u64,
    ) -> redis::RedisResult<bool> {
        let mut con = self.connection().await?;
        let stored: i32 = PUT_IF_CURRENT
            .key(generation_key(user_id))
            .key(key)
            .arg(generation)
            .arg(payload)
            .arg(self.ttl_secs)
            .invoke_async(&mut con)
            .await?;
        Ok(stored == 1)
    }

    async fn try_invalidate(&self, user_id: Uuid) -> redis::RedisResult<()> {
        let mut con = self.connection().await?;
        redis::pipe()
            .atomic()
            .incr(generation_key(user_id), 1)
            .ignore()
            .del(cache_key(user_id, JobFlag::Favorite))
            .ignore()
            .del(cache_key(user_id, JobFlag::Applied))
            .ignore()
            .query_async(&mut con)
            .await
    }
}

#[async_trait]
impl RecordCache for RedisRecordCache {
    async fn get(&self, user_id: Uuid, flag: JobFlag) -> Option<Vec<JobRecord>> {
        let key = cache_key(user_id, flag);
        let payload = match self.try_get(&key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(e) => {
                warn!("Redis read of {key} failed: {e}");
                return None;
            }
        };
        match serde_json::from_str(&payload) {
            Ok(records) => {
                debug!("Cache hit for {key}");
                Some(records)
            }
            Err(e) => {
                warn!("Discarding undecodable cache entry {key}: {e}");
                None
            }
        }
    }

    async fn generation(&self, user_id: Uuid) -> Option<u64> {
        match self.try_generation(user_id).await {
            Ok(generation) => Some(generation),
            Err(e) => {
                warn!("Redis generation read for user {user_id} failed: {e}");
                None
            }
        }
    }

    async fn put(&self, user_id: Uuid, flag: JobFlag, records: &[JobRecord], generation: u64) {
        let key = cache_key(user_id, flag);
        let payload = match serde_json::to_string(records) {
            Ok(p) => p,
            Err(e) => {
                warn!("Could not serialize {key} for caching: {e}");
                return;
            }
        };
        match self.try_put(user_id, &key, payload, generation).await {
            Ok(true) => {}
            Ok(false) => debug!("Skipped caching {key}: invalidated during read"),
            Err(e) => warn!("Redis write of {key} failed: {e}"),
        }
    }

    async fn invalidate(&self, user_id: Uuid) {
        if let Err(e) = self.try_invalidate(user_id).await {
            warn!("Redis invalidation for user {user_id} failed: {e}");
        }
    }
}

pub fn cache_key(user_id: Uuid, flag: JobFlag) -> String {
    format!("jobtrack:jobs:{user_id}:{}", flag.label())
}

pub fn generation_key(user_id: Uuid) -> String {
    format!("jobtrack:jobs:{user_id}:gen")
}
