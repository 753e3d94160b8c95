//! Local web server hosting the redirect target.
//!
//! The browser loads `/`, clicks through to `/signin`, is redirected to the
//! provider and comes back to `/` with `code` and `state`.

pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::auth::SessionStore;
use crate::client::FhirClient;
use crate::config::Config;

/// Name of the cookie carrying the browser session id.
pub const SESSION_COOKIE: &str = "sid";

/// Shared state for HTTP handlers.
pub struct AppState {
    pub config: Config,
    pub client: Arc<FhirClient>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    /// Build the client and session store from `config`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = Arc::new(FhirClient::new(&config)?);
        let sessions = Arc::new(SessionStore::new(config.pending_auth_ttl));
        Ok(Self { config, client, sessions })
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").field("client", &self.client).finish()
    }
}

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::handle_index))
        .route("/signin", get(handlers::handle_signin))
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Chart viewer web application.
pub struct ChartServer {
    state: Arc<AppState>,
}

impl ChartServer {
    /// Create a new server.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self { state: Arc::new(AppState::new(config)?) })
    }

    /// Serve until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns error on bind or server failure.
    pub async fn run(self, addr: SocketAddr) -> anyhow::Result<()> {
        Arc::clone(&self.state.sessions).start_cleanup_task();

        let router = create_router(Arc::clone(&self.state));

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(
            "Open http://{} and sign in (redirect URI: {})",
            listener.local_addr()?,
            self.state.config.redirect_uri
        );

        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}

impl std::fmt::Debug for ChartServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartServer").field("state", &self.state).finish()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install CTRL+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
