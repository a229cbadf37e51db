//! Debate Arena server entry point.
//!
//! Loads configuration, wires the conversation store and completion
//! gateway behind the orchestrator, and serves the JSON API plus the
//! static browser client.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use debate_arena::adapters::ai::{HttpCompletionGateway, HttpGatewayConfig, MockCompletionGateway};
use debate_arena::adapters::http::debate::{api_router, DebateAppState};
use debate_arena::adapters::store::{InMemoryConversationStore, RedisConversationStore};
use debate_arena::application::{DebateOrchestrator, SessionLifecycle};
use debate_arena::config::{AiProvider, AppConfig, StoreBackend};
use debate_arena::domain::persona::PersonaCatalog;
use debate_arena::ports::{CompletionGateway, ConversationStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    config.validate()?;

    let store: Arc<dyn ConversationStore> = match config.store.backend {
        StoreBackend::Memory => {
            tracing::info!("using in-memory conversation store");
            Arc::new(InMemoryConversationStore::new())
        }
        StoreBackend::Redis => {
            tracing::info!(url = %config.store.url, "connecting redis conversation store");
            Arc::new(RedisConversationStore::connect(&config.store.url, config.store.ttl_secs).await?)
        }
    };

    let gateway: Arc<dyn CompletionGateway> = match config.ai.provider {
        AiProvider::Openai => {
            let api_key = config
                .ai
                .api_key
                .clone()
                .expect("validated: openai provider has an api key");
            let gateway_config = HttpGatewayConfig::new(api_key.expose_secret().clone())
                .with_model(&config.ai.model)
                .with_base_url(&config.ai.base_url)
                .with_timeout(config.ai.timeout());
            Arc::new(HttpCompletionGateway::new(gateway_config))
        }
        AiProvider::Mock => {
            tracing::warn!("using mock completion gateway; replies are canned");
            Arc::new(MockCompletionGateway::new())
        }
    };

    let catalog = Arc::new(PersonaCatalog::built_in());
    let orchestrator = Arc::new(DebateOrchestrator::new(
        catalog.clone(),
        store.clone(),
        gateway,
    ));
    let lifecycle = Arc::new(SessionLifecycle::new(store));
    let state = DebateAppState::new(orchestrator, lifecycle, catalog);

    let cors = {
        let origins: Vec<HeaderValue> = config
            .server
            .cors_origins_list()
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        if origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    let app = api_router(state)
        .fallback_service(ServeDir::new(&config.server.static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(CompressionLayer::new())
        .layer(cors);

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "debate-arena listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
