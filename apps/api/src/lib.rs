//! Tailor API: tailors a base resume to a job description with an LLM,
//! compiles it to a PDF, and serves the artifact through a TTL-bound cache
//! with deferred, exactly-once reclamation of its backing storage.

pub mod cache;
pub mod cleanup;
pub mod compile;
pub mod config;
pub mod errors;
pub mod generation;
pub mod llm_client;
pub mod models;
pub mod render;
pub mod routes;
pub mod state;
pub mod tailor;
