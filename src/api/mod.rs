//! HTTP API server for the Lisa gateway

pub mod chat;
pub mod health;
pub mod voice;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::responder::Responder;
use crate::voice::{SpeakQueue, Transcriber};
use crate::Result;

/// Shared state for API handlers
pub struct ApiState {
    /// Produces the reply for each chat utterance
    pub responder: Responder,

    /// Speak queue handle; `None` when voice output is disabled or absent
    pub speaker: Option<SpeakQueue>,

    /// Speech recognizer for the transcription endpoint
    pub stt: Arc<dyn Transcriber>,
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Create an API server over the shared state
    #[must_use]
    pub fn new(state: Arc<ApiState>, port: u16, static_dir: Option<PathBuf>) -> Self {
        Self {
            state,
            port,
            static_dir,
        }
    }

    /// Build the router with all routes
    fn router(&self) -> Router {
        let mut router = router(self.state.clone());

        // Serve the chat page and its assets if configured
        if let Some(static_dir) = &self.static_dir {
            let index_file = static_dir.join("index.html");
            let serve_dir = ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

            router = router.fallback_service(serve_dir);
            tracing::info!(path = %static_dir.display(), "serving static files");
        }

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server until interrupted
    ///
    /// # Errors
    ///
    /// Returns error if the server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("shutting down");
            })
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}

/// Build a router directly from state, for tests and embedding
#[must_use]
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(chat::router(state.clone()))
        .merge(voice::router(state))
        .merge(health::router())
}
