//! Resume schema shared by the base-resume file, the LLM contract, and the
//! LaTeX renderer. Deserialization doubles as schema validation: an LLM
//! response missing a required field fails to parse and surfaces as a
//! generation error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub university: String,
    pub location: String,
    pub degree: String,
    pub date: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub title: String,
    pub date: String,
    pub company: String,
    pub location: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub skills: String,
    pub bullets: Vec<String>,
}

/// Skill groups keyed by section label ("Languages", "Frameworks", ...).
/// BTreeMap keeps rendering and serialization order deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    pub sections: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    pub education: Education,
    pub experiences: Vec<Experience>,
    pub projects: Vec<Project>,
    pub skills: Skills,
}

/// One edit the model made to the base resume. Streamed to the client as a
/// progress event and then discarded, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    pub before: String,
    pub after: String,
    pub reason: String,
}

/// The full result of one tailoring call: the adjusted resume plus one
/// changelog entry per modification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailorOutcome {
    pub resume: Resume,
    pub changelog: Vec<ChangeLogEntry>,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_round_trips_through_json() {
        let resume = fixtures::sample_resume();
        let json = serde_json::to_string(&resume).unwrap();
        let recovered: Resume = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered, resume);
    }

    #[test]
    fn test_tailor_outcome_requires_both_fields() {
        // schema validation: a response with only a resume is rejected
        let resume_json = serde_json::to_value(fixtures::sample_resume()).unwrap();
        let bad = serde_json::json!({ "resume": resume_json });
        assert!(serde_json::from_value::<TailorOutcome>(bad).is_err());
    }

    #[test]
    fn test_changelog_entry_requires_reason() {
        let bad = serde_json::json!({ "before": "a", "after": "b" });
        assert!(serde_json::from_value::<ChangeLogEntry>(bad).is_err());
    }

    #[test]
    fn test_unknown_fields_are_tolerated() {
        // models sometimes add commentary fields; ignore rather than reject
        let json = serde_json::json!({
            "before": "a", "after": "b", "reason": "c", "confidence": 0.9
        });
        assert!(serde_json::from_value::<ChangeLogEntry>(json).is_ok());
    }
}
