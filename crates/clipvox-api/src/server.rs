//! HTTP API Server
//!
//! Starts and manages the axum-based HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use clipvox_core::{ScriptOrchestrator, ServerConfig};
use clipvox_voice::SpeechSynthesizer;
use tracing::info;

use crate::error::Result;
use crate::routes::router;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub script: Arc<ScriptOrchestrator>,
    pub speech: Arc<SpeechSynthesizer>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(script: ScriptOrchestrator, speech: SpeechSynthesizer) -> Self {
        Self {
            script: Arc::new(script),
            speech: Arc::new(speech),
            started_at: Instant::now(),
        }
    }
}

/// Start the HTTP API server and serve until the listener fails
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = router(state, config.allowed_origins.as_deref());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP API listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
