//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;

use crate::application::services::SessionRegistry;
use crate::config::Settings;
use crate::presentation::http::handlers::health;
use crate::presentation::http::routes;
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::gateway::Gateway;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub registry: Arc<SessionRegistry>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire the gateway and the session registry together.
    pub fn new(settings: Settings) -> Self {
        let gateway = Arc::new(Gateway::new());
        let registry = Arc::new(SessionRegistry::new(
            gateway.clone(),
            settings.game.clone(),
        ));

        Self {
            gateway,
            registry,
            settings: Arc::new(settings),
        }
    }
}

/// Build the router with middleware
pub fn build_router(state: AppState) -> Router {
    let cors_layer = cors::create_cors_layer(&state.settings.cors);
    routes::create_router(state).layer(
        ServiceBuilder::new()
            .layer(logging::create_trace_layer())
            .layer(cors_layer),
    )
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    state: AppState,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let addr = settings
            .server
            .socket_addr()
            .with_context(|| format!("Invalid server address {}", settings.server_addr()))?;

        health::init_server_start();

        let state = AppState::new(settings);
        let router = build_router(state.clone());

        // Bind to address
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            router,
            state,
        })
    }

    /// Run the server until Ctrl-C, then close every live session
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        self.state.registry.shutdown().await;
        tracing::info!("Shutdown complete");
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received shutdown signal"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for ctrl-c"),
    }
}
