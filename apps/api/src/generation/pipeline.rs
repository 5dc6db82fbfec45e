//! The generation pipeline state machine.
//!
//! `ComputingKey → CheckingCache(hit|miss) → [miss] Generating →
//! [miss] ChangeLog* → [miss] Rendering → [miss] Compiling →
//! Cleanup → CacheWrite → Done`, with terminal failures for the model call,
//! the compiler, and a store write after an otherwise-successful run.
//!
//! One run serves only its own request. Concurrent identical requests may
//! each run the full pipeline; every run compiles into its own uuid-suffixed
//! directory, so the last store write wins and each directory still gets
//! exactly one scheduled reclamation.
//!
//! Event sends are best-effort: a disconnected consumer never cancels the
//! run, so the store is still populated for later retrieval by key.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::key::{canonical_payload, derive_key, RequestKey};
use crate::cache::store::{ArtifactRecord, StoreError};
use crate::cleanup::ScheduledCleanup;
use crate::compile::{CompileError, TexGuard};
use crate::generation::events::{PipelineEvent, Stage};
use crate::render::render;
use crate::state::AppState;
use crate::tailor::TailorError;

#[derive(Debug, Error)]
enum PipelineError {
    #[error("generation failed: {0}")]
    Generation(#[from] TailorError),

    #[error("compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error("artifact store unreachable: {0}")]
    Store(#[from] StoreError),

    #[error("generated but not retrievable: artifact store write failed: {0}")]
    CacheWrite(StoreError),

    #[error("could not prepare artifact workspace: {0}")]
    Workspace(#[from] std::io::Error),
}

/// Runs one pipeline request to completion, emitting events on `tx`.
/// Always ends with exactly one terminal event.
pub async fn run_pipeline(state: AppState, job_info: String, tx: mpsc::Sender<PipelineEvent>) {
    match run_stages(&state, &job_info, &tx).await {
        Ok((key, cached)) => {
            emit(&tx, PipelineEvent::Done { key, cached }).await;
        }
        Err(e) => {
            warn!("pipeline run failed: {e}");
            emit(
                &tx,
                PipelineEvent::Error {
                    message: e.to_string(),
                },
            )
            .await;
        }
    }
}

async fn run_stages(
    state: &AppState,
    job_info: &str,
    tx: &mpsc::Sender<PipelineEvent>,
) -> Result<(RequestKey, bool), PipelineError> {
    emit(tx, PipelineEvent::progress(Stage::ComputingKey)).await;
    let key = derive_key(canonical_payload(job_info));

    if let Some(record) = state.store.try_get(&key).await? {
        info!(key = %key, "cache hit, skipping generation");
        emit(tx, PipelineEvent::progress(Stage::CheckingCache { hit: true })).await;
        return Ok((record.key, true));
    }
    emit(tx, PipelineEvent::progress(Stage::CheckingCache { hit: false })).await;

    emit(tx, PipelineEvent::progress(Stage::Generating)).await;
    let outcome = state.tailor.tailor(&state.base_resume, job_info).await?;
    info!(key = %key, changes = outcome.changelog.len(), "tailoring complete");

    for entry in &outcome.changelog {
        emit(
            tx,
            PipelineEvent::progress(Stage::ChangeLog {
                entry: entry.clone(),
            }),
        )
        .await;
    }

    emit(tx, PipelineEvent::progress(Stage::Rendering)).await;
    let latex = render(&outcome.resume);

    emit(tx, PipelineEvent::progress(Stage::Compiling)).await;
    let artifact_dir = artifact_dir(&state.config.build_dir, &key);
    tokio::fs::create_dir_all(&artifact_dir).await?;
    let tex = TexGuard::write(artifact_dir.join("resume.tex"), &latex).await?;
    let pdf_path = state.compiler.compile(tex.path(), &artifact_dir).await?;

    // Intermediate tex removal happens on every exit path via the guard;
    // this transition just reports the success-path removal.
    drop(tex);
    emit(tx, PipelineEvent::progress(Stage::Cleanup)).await;

    emit(tx, PipelineEvent::progress(Stage::CacheWrite)).await;
    let record = ArtifactRecord::new(
        key.clone(),
        pdf_path.to_string_lossy().into_owned(),
        state.config.artifact_ttl_secs,
    );
    state
        .store
        .put(&record)
        .await
        .map_err(PipelineError::CacheWrite)?;

    // Armed only after the write returns: the reclamation delay counts from
    // the same clock the record's TTL started on, so a slow write cannot
    // open an early-reclamation window.
    let cleanup = ScheduledCleanup::after_expiry(
        artifact_dir.to_string_lossy().into_owned(),
        state.config.artifact_ttl_secs,
        state.config.cleanup_grace_secs,
    );

    // A missed cleanup is a storage leak, not a correctness break: the cache
    // record still expires on its own, so this never fails the request.
    if let Err(e) = state.scheduler.schedule(&cleanup).await {
        warn!(key = %key, "failed to schedule artifact cleanup: {e}");
    }

    info!(key = %key, pdf = %pdf_path.display(), "pipeline complete");
    Ok((key, false))
}

/// A fresh directory for this run's artifact. The uuid suffix makes every
/// run's path unique, so a stale scheduled cleanup can only ever target a
/// directory no live record points at.
fn artifact_dir(build_dir: &str, key: &RequestKey) -> PathBuf {
    let short = &key.as_str()[..12];
    Path::new(build_dir).join(format!("{short}-{}", Uuid::new_v4()))
}

async fn emit(tx: &mpsc::Sender<PipelineEvent>, event: PipelineEvent) {
    // Best-effort: the consumer may be gone; the pipeline keeps going.
    let _ = tx.send(event).await;
}
