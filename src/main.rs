//! Contrakt - contract drafting agent
//!
//! Routes each user message to information, conversation, contribution
//! intake or retrieval-augmented contract drafting, and serves the result
//! over HTTP.

mod api;
mod artifact;
mod config;
mod contribution;
mod db;
mod llm;
mod prompts;
mod retrieval;
mod runtime;
mod state_machine;
mod templates;

use api::{create_router, AppState};
use config::AppConfig;
use db::Database;
use llm::ModelRegistry;
use retrieval::SupabaseRetriever;
use runtime::{
    ContributionSink, DatabaseContributionSink, GenerationPort, Orchestrator, RegistryGenerator,
    RetrievalPort,
};
use std::net::SocketAddr;
use std::sync::Arc;
use templates::TemplateIndex;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contrakt=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration; missing credentials are fatal
    let config = AppConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
    })?;

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Initialize database
    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;

    // Initialize LLM registry
    let llm_registry = Arc::new(ModelRegistry::new(&config.llm));
    if !llm_registry.has_models() {
        return Err("No generation models available for the configured credentials".into());
    }
    tracing::info!(
        models = ?llm_registry.available_models(),
        router = %llm_registry.router_model_id(),
        drafter = %llm_registry.drafter_model_id(),
        "LLM registry initialized"
    );

    // Template catalog
    let templates = match &config.templates_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading template catalog");
            TemplateIndex::load(path)?
        }
        None => TemplateIndex::builtin(),
    };
    tracing::info!(count = templates.len(), "Templates ready");

    // Orchestrator
    let generator: Arc<dyn GenerationPort> = Arc::new(RegistryGenerator::new(llm_registry));
    let retriever: Arc<dyn RetrievalPort> =
        Arc::new(SupabaseRetriever::from_config(&config.retrieval));
    let sink: Arc<dyn ContributionSink> = Arc::new(DatabaseContributionSink::new(db.clone()));
    let orchestrator = Orchestrator::new(generator, retriever, sink, Arc::new(templates));

    // Create application state
    let state = AppState::new(Arc::new(orchestrator), db, config.invocation_timeout);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Contrakt server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
