//! # HTTP Server
//!
//! Combines the paste, blob, and health routers behind one listener.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use super::paste_routes::{paste_routes, upload_routes, AppState};
use crate::config::Config;
use crate::observability::{Logger, Severity};
use crate::store::PasteStore;

/// Slack on top of the configured upload limit for multipart framing.
const BODY_LIMIT_OVERHEAD: usize = 64 * 1024;

/// HTTP server for the paste service
pub struct HttpServer {
    config: Config,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over an opened store
    pub fn new(config: Config, store: PasteStore) -> Self {
        let state = Arc::new(AppState { store });
        let router = Self::build_router(&config, state);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &Config, state: Arc<AppState>) -> Router {
        // Configure CORS from config
        let cors = if config.cors_origins.is_empty() {
            // If no origins configured, use permissive for development
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            use tower_http::cors::AllowOrigin;
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let body_limit = usize::try_from(config.max_upload_bytes)
            .unwrap_or(usize::MAX)
            .saturating_add(BODY_LIMIT_OVERHEAD);

        Router::new()
            .merge(health_routes())
            .nest("/api", paste_routes(state.clone()))
            .merge(upload_routes(state))
            .layer(DefaultBodyLimit::max(body_limit))
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server (async)
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid socket address '{}': {}", self.config.socket_addr(), e),
            )
        })?;

        Logger::log(
            Severity::Info,
            "http_server_started",
            &[("addr", &addr.to_string())],
        );

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check route at the root level
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(data_dir: &str) -> Config {
        serde_json::from_value(serde_json::json!({
            "data_dir": data_dir,
            "port": 8099,
        }))
        .unwrap()
    }

    #[test]
    fn test_server_builds_router() {
        let temp = TempDir::new().unwrap();
        let store = PasteStore::open(temp.path(), 1024).unwrap();
        let config = test_config(&temp.path().to_string_lossy());

        let server = HttpServer::new(config, store);
        assert_eq!(server.socket_addr(), "0.0.0.0:8099");

        let _router = server.router();
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("ok"));
    }
}
