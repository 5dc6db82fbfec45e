//! Axum route handlers for tailoring and artifact retrieval.

use axum::{
    extract::{Path, State},
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Form,
};
use bytes::Bytes;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::{wrappers::ReceiverStream, Stream, StreamExt};

use crate::cache::key::RequestKey;
use crate::errors::AppError;
use crate::generation::pipeline::run_pipeline;
use crate::state::AppState;

/// Identical response for a key that was never produced and one whose TTL
/// lapsed; the store keeps no tombstones, so the two are indistinguishable.
const ABSENT: &str = "No artifact for this key";

const EVENT_BUFFER: usize = 64;

#[derive(Debug, Deserialize)]
pub struct TailorRequest {
    pub job_info: String,
}

/// POST /api/v1/resumes/tailor
///
/// Starts a pipeline run and streams its progress as SSE. The run executes in
/// a detached task: a client disconnect ends the stream but not the run, so
/// the artifact still lands in the store for retrieval by key.
pub async fn handle_tailor(
    State(state): State<AppState>,
    Form(request): Form<TailorRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    if request.job_info.trim().is_empty() {
        return Err(AppError::Validation("job_info cannot be empty".to_string()));
    }

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    tokio::spawn(run_pipeline(state, request.job_info, tx));

    let stream = ReceiverStream::new(rx).map(|event| Event::default().json_data(&event));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// GET /api/v1/resumes/:key
///
/// Serves the compiled artifact for a previously completed run. 404 for a
/// malformed, unknown, or expired key.
pub async fn handle_retrieve(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let key = RequestKey::parse(&key).ok_or_else(|| AppError::NotFound(ABSENT.to_string()))?;

    let record = state
        .store
        .try_get(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(ABSENT.to_string()))?;

    let pdf = match tokio::fs::read(&record.artifact_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(ABSENT.to_string()));
        }
        Err(e) => return Err(AppError::Internal(e.into())),
    };

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"resume.pdf\"".to_string(),
            ),
        ],
        Bytes::from(pdf),
    )
        .into_response())
}
