//! BookStoreBot - conversational bookstore ordering assistant
//!
//! A Rust backend wiring a remote language model to a small dialogue state
//! machine, a book catalog and a per-session order.

mod api;
mod catalog;
mod config;
mod conversation;
mod llm;
mod order;
mod runtime;
mod state_machine;
mod system_prompt;
mod tools;

use api::{create_router, AppState};
use config::Config;
use llm::ModelRegistry;
use order::LogSink;
use runtime::{ConversationDriver, RegistryLlmClient, SessionManager};
use std::net::SocketAddr;
use std::sync::Arc;
use tools::ToolDispatcher;
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
                .unwrap_or_else(|_| "bookstore_bot=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env();

    // Initialize LLM registry
    let llm_registry = Arc::new(ModelRegistry::new(&config.llm));

    if llm_registry.has_models() {
        tracing::info!(
            models = ?llm_registry.available_models(),
            default = %llm_registry.default_model_id(),
            "LLM registry initialized"
        );
    } else {
        tracing::warn!(
            "No LLM API keys configured. Set GEMINI_API_KEY, ANTHROPIC_API_KEY or LLM_GATEWAY."
        );
    }

    // Conversation driver and sessions
    let llm_client = RegistryLlmClient::new(
        llm_registry.clone(),
        llm_registry.default_model_id().to_string(),
    );
    let driver = ConversationDriver::new(
        Arc::new(llm_client),
        ToolDispatcher::new(Arc::new(LogSink)),
        config.driver,
    );
    let sessions = Arc::new(SessionManager::new(driver));

    let state = AppState::new(sessions, llm_registry);

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
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        max_round_trips = config.driver.max_round_trips,
        "BookStoreBot server listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
