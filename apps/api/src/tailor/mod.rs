//! Pluggable tailoring seam: turns a base resume plus a job description into
//! a tailored resume and a changelog.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::llm_client::prompts::{TAILOR_PROMPT_TEMPLATE, TAILOR_RULES, TAILOR_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::resume::{Resume, TailorOutcome};

#[derive(Debug, Error)]
pub enum TailorError {
    #[error("model unreachable: {0}")]
    Unreachable(String),

    #[error("model call exceeded its deadline")]
    Timeout,

    #[error("model output did not match the resume schema: {0}")]
    Schema(String),
}

impl From<LlmError> for TailorError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Timeout => TailorError::Timeout,
            LlmError::Parse(e) => TailorError::Schema(e.to_string()),
            LlmError::EmptyContent => TailorError::Schema("empty response".to_string()),
            other => TailorError::Unreachable(other.to_string()),
        }
    }
}

/// A tailoring strategy. Implementations must be side-effect free beyond the
/// collaborator call itself; the pipeline owns all caching and cleanup.
#[async_trait]
pub trait ResumeTailor: Send + Sync {
    async fn tailor(&self, base: &Resume, job_info: &str) -> Result<TailorOutcome, TailorError>;

    fn name(&self) -> &'static str;
}

/// Tailors via the Anthropic Messages API.
pub struct AnthropicTailor {
    llm: LlmClient,
}

impl AnthropicTailor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeTailor for AnthropicTailor {
    async fn tailor(&self, base: &Resume, job_info: &str) -> Result<TailorOutcome, TailorError> {
        let resume_json = serde_json::to_string_pretty(base)
            .map_err(|e| TailorError::Schema(format!("base resume failed to serialize: {e}")))?;

        let prompt = TAILOR_PROMPT_TEMPLATE
            .replace("{job_description}", job_info)
            .replace("{resume}", &resume_json)
            .replace("{rules}", TAILOR_RULES);

        let outcome: TailorOutcome = self.llm.call_json(&prompt, TAILOR_SYSTEM).await?;

        info!(
            changes = outcome.changelog.len(),
            "tailoring call completed"
        );
        Ok(outcome)
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

/// Returns the base resume unchanged with an empty changelog. Used when
/// tailoring is disabled and as the deterministic seam in pipeline tests.
pub struct PassthroughTailor;

#[async_trait]
impl ResumeTailor for PassthroughTailor {
    async fn tailor(&self, base: &Resume, _job_info: &str) -> Result<TailorOutcome, TailorError> {
        Ok(TailorOutcome {
            resume: base.clone(),
            changelog: Vec::new(),
        })
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }
}
