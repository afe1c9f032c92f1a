//! HTTP server implementation using Axum.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use profrag_core::config::GatewayConfig;
use profrag_rag::RagPipeline;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub gateway_config: GatewayConfig,
    /// Request pipeline; stateless, shared by every request.
    pub pipeline: Arc<RagPipeline>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(gateway_config: GatewayConfig, pipeline: RagPipeline) -> Self {
        Self {
            gateway_config,
            pipeline: Arc::new(pipeline),
            start_time: Instant::now(),
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.gateway_config.cors_origins);

    Router::new()
        .route("/api/chat", post(super::routes::chat))
        .route("/health", get(super::routes::health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Browsers call the chat endpoint cross-origin from the frontend. An empty
/// origin list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();
    if allowed.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(allowed)
    }
}

/// Start the HTTP server.
pub async fn start(config: &GatewayConfig, pipeline: RagPipeline) -> anyhow::Result<()> {
    let namespace = pipeline.namespace().to_string();
    let app = build_router(AppState::new(config.clone(), pipeline));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 ProfRAG gateway listening on http://{}", addr);
    tracing::info!("   POST /api/chat  (namespace '{}')", namespace);

    axum::serve(listener, app).await?;
    Ok(())
}
