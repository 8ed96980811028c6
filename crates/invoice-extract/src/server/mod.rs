//! HTTP server for invoice extraction

pub mod routes;
pub mod state;

use axum::{http::HeaderValue, routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, ServerConfig};
use crate::error::{Error, Result};
use state::AppState;

/// Invoice HTTP server
pub struct InvoiceServer {
    config: AppConfig,
    state: AppState,
}

impl InvoiceServer {
    /// Create a new server backed by Gemini and the JSON file log
    pub fn new(config: AppConfig) -> Result<Self> {
        let state = AppState::new(config.clone())?;
        Ok(Self { config, state })
    }

    /// Create a server around existing state
    pub fn with_state(state: AppState) -> Self {
        Self {
            config: state.config().clone(),
            state,
        }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Result<Router> {
        let cors = cors_layer(&self.config.server)?;
        let invoice_routes = routes::invoice_routes(self.config.server.max_file_size);

        let mount = self.config.server.mount_path.trim_end_matches('/');
        let router = Router::new().route("/health", get(health_check));
        // nesting at the root is not allowed
        let router = if mount.is_empty() {
            router.merge(invoice_routes)
        } else {
            router.nest(mount, invoice_routes)
        };

        Ok(router
            .with_state(self.state.clone())
            // Middleware layers (order matters - applied bottom to top)
            .layer(TraceLayer::new_for_http())
            .layer(cors))
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.router()?;

        tracing::info!("Starting invoice server on http://{}", addr);
        tracing::info!(
            "Invoice API mounted at http://{}{}",
            addr,
            self.config.server.mount_path
        );

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

fn cors_layer(config: &ServerConfig) -> Result<CorsLayer> {
    let origin = match &config.allowed_origin {
        Some(origin) => {
            let value = HeaderValue::from_str(origin)
                .map_err(|e| Error::Config(format!("Invalid allowed origin '{}': {}", origin, e)))?;
            AllowOrigin::exact(value)
        }
        None => AllowOrigin::from(Any),
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
