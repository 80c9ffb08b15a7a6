//! ragserve entrypoint
//!
//! Wires the configuration, the Chroma-backed knowledge store, the
//! Responses-API model, the tool registry and the agent runner into an
//! axum service.

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use ragserve_agent::{
    AgentRunner, ConversationStore, KnowledgeBaseQueryTool, OpenAiResponsesModel, ToolRegistry,
    WebFetchTool,
};
use ragserve_store::{ChromaStore, OpenAiEmbedder};

mod api;
mod config;
mod seeding;

use api::AppState;
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Missing credentials are fatal: the process refuses to start.
    let config = AppConfig::from_env()?;

    let embedder = Arc::new(OpenAiEmbedder::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
    )?);
    let store = Arc::new(ChromaStore::new(
        &config.chroma_host,
        config.chroma_port,
        embedder,
    )?);

    let model = OpenAiResponsesModel::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
    )?
    .with_model(config.openai_model.clone());

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(KnowledgeBaseQueryTool::new(store.clone())));
    registry.register(Arc::new(WebFetchTool::new(store.clone())?));

    let runner = Arc::new(AgentRunner::new(
        model,
        registry,
        Arc::new(ConversationStore::new()),
    ));

    let app = api::create_router(AppState::new(runner, store));
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(
        title = %config.app_title,
        description = %config.app_description,
        address = %listener.local_addr()?,
        "ragserve listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
