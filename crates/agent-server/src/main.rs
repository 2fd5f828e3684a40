//! science-agent HTTP Server
//!
//! Axum-based server providing the research agent's REST API and hosting the
//! web UI. A missing credential keeps the server up in an unhealthy state;
//! `/health` retries initialization on every call.

mod handlers;
mod routes;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_runtime::{AgentSettings, research_agent_cell};

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = AgentSettings::from_env();
    tracing::debug!(?settings, "Loaded agent settings");
    let cell = Arc::new(research_agent_cell(settings));

    // Eager attempt so misconfiguration shows up in the logs at startup
    match cell.get_or_init().await {
        Ok(handle) => {
            tracing::info!("✓ Research agent ready");
            for name in handle.tool_names() {
                tracing::info!("  • {}", name);
            }
        }
        Err(e) => {
            tracing::warn!("⚠ Agent not initialized: {}", e);
            tracing::warn!("  Set GROQ_API_KEY in .env or the environment; /health will retry");
        }
    }

    let static_dir =
        PathBuf::from(std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".into()));
    let app = routes::router(AppState::new(cell), &static_dir);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| {
        let port = std::env::var("PORT").unwrap_or_else(|_| "7860".into());
        format!("0.0.0.0:{port}")
    });
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🔬 science-agent server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /           - API information");
    tracing::info!("  GET  /health     - Health check");
    tracing::info!("  GET  /api/tools  - Tool catalog");
    tracing::info!("  POST /api/query  - Ask one question");
    tracing::info!("  POST /api/chat   - Multi-turn chat");
    tracing::info!("  GET  /ui         - Web UI ({})", static_dir.display());

    axum::serve(listener, app).await?;

    Ok(())
}
