//! The tailoring pipeline: progress events, the stage state machine, and the
//! HTTP handlers that expose it.

pub mod events;
pub mod handlers;
pub mod pipeline;
