//! Preview server for a built site.

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::Router;
use tower_http::services::ServeDir;

/// Configuration for the preview server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory to serve
    pub dir: PathBuf,

    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Open browser on start
    pub open: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("dist"),
            host: "127.0.0.1".to_string(),
            port: 8000,
            open: false,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Directory not found: {0}")]
    MissingDir(PathBuf),

    #[error("Invalid address {0}")]
    Address(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("Server error: {0}")]
    Serve(String),

    #[error("File watch error: {0}")]
    WatchError(String),
}

/// Router serving `dir`, with directory requests resolved to `index.html`.
pub fn router(dir: impl AsRef<Path>) -> Router {
    Router::new().fallback_service(ServeDir::new(dir.as_ref()))
}

/// Local static file server.
pub struct PreviewServer {
    config: ServerConfig,
}

impl PreviewServer {
    /// Create a new preview server.
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve until Ctrl+C.
    pub async fn start(self) -> Result<(), ServerError> {
        self.start_with_shutdown(ctrl_c()).await
    }

    /// Serve until `shutdown` resolves.
    pub async fn start_with_shutdown<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if !self.config.dir.is_dir() {
            return Err(ServerError::MissingDir(self.config.dir.clone()));
        }

        let addr_str = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|_| ServerError::Address(addr_str.clone()))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        let url = format!("http://{}", addr);
        tracing::info!("Serving {} at {}", self.config.dir.display(), url);

        if self.config.open {
            let _ = open::that(&url);
        }

        axum::serve(listener, router(&self.config.dir))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        tracing::info!("Server stopped.");

        Ok(())
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
