//! HTTP service
//!
//! An axum router over shared [`AppState`]. Generation runs inline in the
//! request; the store is the only state shared between requests.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use eyre::{Context, Result};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::{AuthConfig, Config};
use crate::plan::PlanGenerator;
use crate::prompts::PromptLoader;
use crate::store::Store;

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::{Credentials, GenerateRequest};

/// Everything a handler needs, injected at construction
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<PlanGenerator>,
    pub store: Arc<Store>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(generator: PlanGenerator, store: Store, auth: AuthConfig) -> Self {
        Self {
            generator: Arc::new(generator),
            store: Arc::new(store),
            auth: Arc::new(auth),
        }
    }

    /// Build the LLM client, prompt loader and database from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        debug!("AppState::from_config: called");
        let base = std::env::current_dir().context("Failed to read current directory")?;
        let generator = PlanGenerator::from_config(&config.llm, PromptLoader::new(base))
            .context("Failed to create LLM client")?;
        info!(models = ?generator.models(), "Model chain ready");
        let store = Store::open(&config.storage.database_path).context("Failed to open database")?;
        Ok(Self::new(generator, store, config.auth.clone()))
    }
}

/// All routes, with request tracing and optional permissive CORS
pub fn router(state: AppState, cors: bool) -> Router {
    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/generate", post(handlers::generate))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout).get(handlers::logout_redirect))
        .route("/history", get(handlers::history))
        .route("/project/{id}", get(handlers::project))
        .route("/auth_status", get(handlers::auth_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors { app.layer(CorsLayer::permissive()) } else { app }
}

/// Serve until SIGINT or SIGTERM, then drain in-flight requests
pub async fn serve(state: AppState, bind: &str, cors: bool) -> Result<()> {
    debug!(%bind, cors, "serve: called");
    let listener = TcpListener::bind(bind)
        .await
        .context(format!("Failed to bind {}", bind))?;
    info!("Planwright listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state, cors))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "shutdown_signal: cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "shutdown_signal: cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => warn!("SIGINT received"),
        _ = terminate => warn!("SIGTERM received"),
    }
    info!("Shutting down...");
}
