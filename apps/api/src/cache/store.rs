//! Redis-backed artifact record store.
//!
//! One record per request key, stored as JSON under `artifact:{key}` with a
//! native redis TTL (`SET .. EX`). Visibility is therefore exactly
//! `now < created_at + ttl`, enforced atomically by redis on read; there is
//! no dual-read race and no background sweep on our side. Writes are
//! idempotent upserts: a fresh `put` overwrites the value and restarts the
//! TTL countdown.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::cache::key::RequestKey;

const KEY_PREFIX: &str = "artifact:";

/// The cached outcome of one successful pipeline run.
/// Created once on pipeline completion, read by retrieval and by the
/// cache-hit fast path, never mutated. Destroyed by native TTL expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub key: RequestKey,
    pub artifact_path: String,
    pub created_at: DateTime<Utc>,
    pub ttl_secs: u64,
}

impl ArtifactRecord {
    pub fn new(key: RequestKey, artifact_path: String, ttl_secs: u64) -> Self {
        Self {
            key,
            artifact_path,
            created_at: Utc::now(),
            ttl_secs,
        }
    }

    /// When the record lapses from the store. Approximate on the read side:
    /// the authoritative countdown is the one the backend starts at write
    /// time.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::seconds(self.ttl_secs as i64)
    }
}

/// The store surface the pipeline and retrieval depend on. `ArtifactStore`
/// is the redis implementation; tests substitute an in-memory one.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns the record iff present and unexpired.
    async fn try_get(&self, key: &RequestKey) -> Result<Option<ArtifactRecord>, StoreError>;

    /// Upserts the record, (re)starting its TTL from the call time.
    /// Overwrites any existing record and its TTL.
    async fn put(&self, record: &ArtifactRecord) -> Result<(), StoreError>;

    /// Removes the record immediately. The main success
    /// path relies on native TTL expiry.
    async fn delete(&self, key: &RequestKey) -> Result<(), StoreError>;
}

/// Failures talking to the backing store. Every operation is a remote call
/// and is fallible independent of business logic.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache backend unreachable: {0}")]
    Backend(#[from] redis::RedisError),

    #[error("stored record is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Handle to the artifact record store. Cheap to clone; constructed once in
/// `main` and injected through `AppState`.
#[derive(Clone)]
pub struct ArtifactStore {
    conn: ConnectionManager,
}

impl ArtifactStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl RecordStore for ArtifactStore {
    async fn try_get(&self, key: &RequestKey) -> Result<Option<ArtifactRecord>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(redis_key(key)).await?;
        match raw {
            Some(json) => {
                let record: ArtifactRecord = serde_json::from_str(&json)?;
                debug!(key = %key, "artifact record hit");
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, record: &ArtifactRecord) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(record)?;
        let _: () = conn
            .set_ex(redis_key(&record.key), json, record.ttl_secs)
            .await?;
        debug!(key = %record.key, ttl_secs = record.ttl_secs, "artifact record written");
        Ok(())
    }

    async fn delete(&self, key: &RequestKey) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(redis_key(key)).await?;
        Ok(())
    }
}

fn redis_key(key: &RequestKey) -> String {
    format!("{KEY_PREFIX}{key}")
}
