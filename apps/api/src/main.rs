use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tailor_api::cache::store::ArtifactStore;
use tailor_api::cleanup::CleanupScheduler;
use tailor_api::compile::PdfLatex;
use tailor_api::config::Config;
use tailor_api::llm_client::LlmClient;
use tailor_api::models::resume::Resume;
use tailor_api::routes::build_router;
use tailor_api::state::AppState;
use tailor_api::tailor::{AnthropicTailor, PassthroughTailor, ResumeTailor};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("tailor_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Redis: one managed connection shared by store and scheduler
    let redis = redis::Client::open(config.redis_url.clone())?;
    let conn = redis
        .get_connection_manager()
        .await
        .context("Failed to connect to Redis")?;
    info!("Redis connection established");

    let store = Arc::new(ArtifactStore::new(conn.clone()));
    let scheduler = Arc::new(CleanupScheduler::new(conn));
    let compiler = Arc::new(PdfLatex::new(Duration::from_secs(
        config.compile_timeout_secs,
    )));

    // Initialize the tailoring strategy (AnthropicTailor unless disabled)
    let tailor: Arc<dyn ResumeTailor> = if config.tailoring_enabled {
        let llm = LlmClient::new(
            config.anthropic_api_key.clone(),
            Duration::from_secs(config.llm_timeout_secs),
        );
        info!(
            "LLM client initialized (model: {})",
            tailor_api::llm_client::MODEL
        );
        Arc::new(AnthropicTailor::new(llm))
    } else {
        info!("Tailoring disabled, serving the base resume as-is");
        Arc::new(PassthroughTailor)
    };
    info!("Tailoring strategy: {}", tailor.name());

    // Load the base resume once at startup
    let base_resume: Resume = serde_json::from_str(
        &std::fs::read_to_string(&config.base_resume_path)
            .with_context(|| format!("Failed to read {}", config.base_resume_path))?,
    )
    .context("Base resume JSON does not match the resume schema")?;
    info!("Base resume loaded from {}", config.base_resume_path);

    // Build app state
    let state = AppState {
        store,
        scheduler,
        compiler,
        tailor,
        base_resume: Arc::new(base_resume),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
