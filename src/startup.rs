//! Application startup and lifecycle management.
//!
//! Builds the completion provider and GraphQL schema, binds the listener,
//! and runs the axum server until stopped.

use crate::config::RelayConfig;
use crate::error::AppError;
use crate::handlers;
use crate::middleware::cors_headers_middleware;
use crate::schema::{build_schema, RelaySchema};
use crate::services::providers::openai::OpenAiProvider;
use crate::services::providers::CompletionProvider;
use axum::{middleware::from_fn, routing::post, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub schema: RelaySchema,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: RelayConfig) -> Result<Self, AppError> {
        let provider: Arc<dyn CompletionProvider> =
            Arc::new(OpenAiProvider::new(config.openai.clone()));

        // The key itself is never logged, only whether one is set.
        tracing::info!(
            api_key_set = !config.openai.api_key.is_empty(),
            api_base = %config.openai.api_base,
            "Initialized OpenAI completion provider"
        );

        let state = AppState {
            schema: build_schema(provider),
        };

        // Port 0 = random port for testing.
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Chat relay service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(self.listener, router).await
    }
}

/// The GraphQL route carries the CORS layer; the readiness fallback is a
/// plain text response without it.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            post(handlers::graphql).options(handlers::preflight),
        )
        .layer(from_fn(cors_headers_middleware))
        .fallback(handlers::ready)
        .method_not_allowed_fallback(handlers::ready)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
