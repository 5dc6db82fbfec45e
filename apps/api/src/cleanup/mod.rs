//! Deferred artifact reclamation.
//!
//! Cleanups are one-shot deferred actions held in a redis sorted set scored
//! by their run-at time, so a crash of the web-facing process never loses a
//! pending reclamation. The `worker` binary drains the queue: it claims due
//! members (ZREM returning 1 is the claim, atomic under concurrent workers)
//! and recursively removes the target directory. Removal of an already-absent
//! directory is a no-op, making redelivery safe.
//!
//! A cleanup is armed once per artifact, after the store write returns, for
//! `ttl + grace` with grace > 0. The store record has always expired by the
//! time reclamation fires, so retrieval can never observe a half-deleted
//! artifact. Cleanups may run arbitrarily late, never early.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Sorted set holding pending reclamations: member = target path,
/// score = run-at time in epoch milliseconds. Member uniqueness gives us at
/// most one pending cleanup per path.
const QUEUE_KEY: &str = "cleanup:due";

/// Upper bound on members claimed per poll.
const CLAIM_BATCH: isize = 16;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("cleanup queue unreachable: {0}")]
    Backend(#[from] redis::RedisError),
}

/// One pending reclamation, as seen by the scheduling side.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledCleanup {
    pub target_path: String,
    pub run_at: DateTime<Utc>,
}

impl ScheduledCleanup {
    /// Arms reclamation of `target_path` for `ttl + grace` from now.
    /// Call this after the store write returns, so the delay counts from the
    /// same clock the record's TTL actually started on; a slow write can
    /// then never leave the cleanup due before the record has expired.
    pub fn after_expiry(target_path: String, ttl_secs: u64, grace_secs: u64) -> Self {
        Self {
            target_path,
            run_at: Utc::now() + chrono::Duration::seconds((ttl_secs + grace_secs) as i64),
        }
    }
}

/// The queue surface the pipeline depends on. `CleanupScheduler` is the
/// redis implementation; tests substitute a recording one.
#[async_trait]
pub trait ReclaimQueue: Send + Sync {
    /// Enqueues one reclamation of `target_path` to run at `run_at`.
    /// Re-scheduling the same path moves its run-at rather than duplicating.
    async fn schedule(&self, cleanup: &ScheduledCleanup) -> Result<(), SchedulerError>;
}

/// Handle for arming deferred reclamations. Cheap to clone, injected through
/// `AppState`; the queue itself lives in redis.
#[derive(Clone)]
pub struct CleanupScheduler {
    conn: ConnectionManager,
}

impl CleanupScheduler {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ReclaimQueue for CleanupScheduler {
    async fn schedule(&self, cleanup: &ScheduledCleanup) -> Result<(), SchedulerError> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .zadd(
                QUEUE_KEY,
                &cleanup.target_path,
                cleanup.run_at.timestamp_millis(),
            )
            .await?;
        debug!(path = %cleanup.target_path, run_at = %cleanup.run_at, "cleanup armed");
        Ok(())
    }
}

/// Claims every member whose run-at is due, removing it from the queue.
/// ZREM's integer reply arbitrates between concurrent workers: whoever
/// removes the member owns it.
///
/// Delivery is at-most-once past the claim: a worker crash between the ZREM
/// and the removal drops that cleanup, leaking the directory instead of
/// redelivering.
async fn claim_due(
    conn: &mut ConnectionManager,
    now: DateTime<Utc>,
) -> Result<Vec<String>, SchedulerError> {
    let due: Vec<String> = conn
        .zrangebyscore_limit(QUEUE_KEY, 0, now.timestamp_millis(), 0, CLAIM_BATCH)
        .await?;

    let mut claimed = Vec::with_capacity(due.len());
    for member in due {
        let removed: i64 = conn.zrem(QUEUE_KEY, &member).await?;
        if removed == 1 {
            claimed.push(member);
        }
    }
    Ok(claimed)
}

/// Recursively removes the directory backing an expired artifact.
/// Idempotent: an absent path is a no-op, so at-least-once delivery of the
/// same cleanup is safe.
pub async fn reclaim_path(target: &Path) -> std::io::Result<bool> {
    match tokio::fs::remove_dir_all(target).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Drains the cleanup queue forever. Run by the `worker` binary.
pub async fn run_worker(conn: ConnectionManager, poll_interval: Duration) {
    info!("Cleanup worker started (poll interval {poll_interval:?})");
    let mut conn = conn;
    loop {
        match claim_due(&mut conn, Utc::now()).await {
            Ok(claimed) => {
                for path in claimed {
                    match reclaim_path(Path::new(&path)).await {
                        Ok(true) => info!(path = %path, "reclaimed artifact directory"),
                        Ok(false) => debug!(path = %path, "artifact directory already absent"),
                        // The member is already claimed; the directory leaks
                        // rather than being retried with a bad path.
                        Err(e) => error!(path = %path, "failed to reclaim artifact directory: {e}"),
                    }
                }
            }
            Err(e) => warn!("cleanup queue poll failed: {e}"),
        }
        tokio::time::sleep(poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_after_expiry_counts_from_now() {
        let before = Utc::now();
        let cleanup = ScheduledCleanup::after_expiry("build/abc".to_string(), 300, 1);
        let after = Utc::now();

        assert!(cleanup.run_at >= before + chrono::Duration::seconds(301));
        assert!(cleanup.run_at <= after + chrono::Duration::seconds(301));
    }

    #[test]
    fn test_after_expiry_is_strictly_past_the_ttl() {
        let cleanup = ScheduledCleanup::after_expiry("build/abc".to_string(), 300, 1);
        // never due before the TTL itself has lapsed
        assert!(cleanup.run_at > Utc::now() + chrono::Duration::seconds(300));
    }

    #[tokio::test]
    async fn test_reclaim_removes_directory_and_contents() {
        let root = tempfile::tempdir().unwrap();
        let artifact_dir = root.path().join("abc123");
        tokio::fs::create_dir_all(artifact_dir.join("nested"))
            .await
            .unwrap();
        tokio::fs::write(artifact_dir.join("resume.pdf"), b"%PDF-1.5")
            .await
            .unwrap();

        assert!(reclaim_path(&artifact_dir).await.unwrap());
        assert!(!artifact_dir.exists());
    }

    #[tokio::test]
    async fn test_reclaim_absent_path_is_noop() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("never-created");

        assert!(!reclaim_path(&missing).await.unwrap());
        // redelivery of the same cleanup
        assert!(!reclaim_path(&missing).await.unwrap());
    }

    #[tokio::test]
    async fn test_reclaim_leaves_sibling_paths_alone() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("expired");
        let sibling = root.path().join("still-live");
        tokio::fs::create_dir_all(&target).await.unwrap();
        tokio::fs::create_dir_all(&sibling).await.unwrap();

        assert!(reclaim_path(&target).await.unwrap());
        assert!(sibling.exists());
    }
}
