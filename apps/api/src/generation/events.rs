//! Progress events streamed to the client while a pipeline run executes.
//!
//! One event per state-machine transition, delivered in transition order.
//! A stream carries zero or more `progress` events and exactly one terminal
//! event (`done` or `error`), after which it ends.

use serde::Serialize;

use crate::cache::key::RequestKey;
use crate::models::resume::ChangeLogEntry;

/// One pipeline stage, as reported to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    ComputingKey,
    CheckingCache { hit: bool },
    Generating,
    ChangeLog { entry: ChangeLogEntry },
    Rendering,
    Compiling,
    Cleanup,
    CacheWrite,
}

/// Wire type for one SSE message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    Progress {
        #[serde(flatten)]
        stage: Stage,
    },
    Done {
        key: RequestKey,
        cached: bool,
    },
    Error {
        message: String,
    },
}

impl PipelineEvent {
    pub fn progress(stage: Stage) -> Self {
        PipelineEvent::Progress { stage }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineEvent::Done { .. } | PipelineEvent::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::key::derive_key;

    #[test]
    fn test_progress_event_wire_shape() {
        let event = PipelineEvent::progress(Stage::CheckingCache { hit: true });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"event": "progress", "stage": "checking_cache", "hit": true})
        );
    }

    #[test]
    fn test_done_event_carries_key() {
        let key = derive_key(b"job");
        let event = PipelineEvent::Done {
            key: key.clone(),
            cached: false,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "done");
        assert_eq!(json["key"], key.as_str());
        assert_eq!(json["cached"], false);
    }

    #[test]
    fn test_changelog_event_embeds_entry() {
        let event = PipelineEvent::progress(Stage::ChangeLog {
            entry: ChangeLogEntry {
                before: "Built a dashboard".to_string(),
                after: "Built a real-time dashboard".to_string(),
                reason: "JD emphasizes real-time systems".to_string(),
            },
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["stage"], "change_log");
        assert_eq!(json["entry"]["reason"], "JD emphasizes real-time systems");
    }

    #[test]
    fn test_terminality() {
        assert!(!PipelineEvent::progress(Stage::Rendering).is_terminal());
        assert!(PipelineEvent::Error {
            message: "x".to_string()
        }
        .is_terminal());
        assert!(PipelineEvent::Done {
            key: derive_key(b"x"),
            cached: true
        }
        .is_terminal());
    }
}
