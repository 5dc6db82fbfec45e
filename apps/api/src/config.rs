use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Directory under which per-artifact output directories are created.
    pub build_dir: String,
    /// Path to the base resume JSON tailored on every request.
    pub base_resume_path: String,
    /// How long a compiled artifact stays retrievable.
    pub artifact_ttl_secs: u64,
    /// Added to the TTL before arming reclamation, so the cache record has
    /// already expired when the cleanup fires. Must be > 0.
    pub cleanup_grace_secs: u64,
    /// Wall-clock deadline for a single LLM call.
    pub llm_timeout_secs: u64,
    /// Wall-clock deadline for a single pdflatex invocation.
    pub compile_timeout_secs: u64,
    /// How often the cleanup worker polls the delayed queue.
    pub cleanup_poll_interval_secs: u64,
    /// When false, requests pass through with the base resume untouched
    /// (no LLM call). Useful for local runs without an Anthropic key.
    pub tailoring_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            redis_url: require_env("REDIS_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            build_dir: optional_env("BUILD_DIR", "build"),
            base_resume_path: optional_env("BASE_RESUME_PATH", "static/base_resume.json"),
            artifact_ttl_secs: parse_secs("ARTIFACT_TTL_SECS", "300")?,
            cleanup_grace_secs: parse_secs("CLEANUP_GRACE_SECS", "1")?,
            llm_timeout_secs: parse_secs("LLM_TIMEOUT_SECS", "120")?,
            compile_timeout_secs: parse_secs("COMPILE_TIMEOUT_SECS", "60")?,
            cleanup_poll_interval_secs: parse_secs("CLEANUP_POLL_INTERVAL_SECS", "1")?,
            tailoring_enabled: optional_env("TAILORING_ENABLED", "true")
                .parse::<bool>()
                .context("TAILORING_ENABLED must be true or false")?,
        };

        anyhow::ensure!(
            config.cleanup_grace_secs > 0,
            "CLEANUP_GRACE_SECS must be positive: reclamation must run strictly after record expiry"
        );

        Ok(config)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_secs(key: &str, default: &str) -> Result<u64> {
    optional_env(key, default)
        .parse::<u64>()
        .with_context(|| format!("{key} must be a whole number of seconds"))
}
