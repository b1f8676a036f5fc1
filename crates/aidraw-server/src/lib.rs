//! Local web server for the drawing UI
//!
//! Serves the JSON API under `/api` and, when configured, the built UI
//! assets with an `index.html` fallback for client-side routes.

#![allow(clippy::must_use_candidate)]

mod api;
mod error;
mod extract;
mod health;
mod history;
mod state;

use std::net::SocketAddr;

use aidraw_config::ServerConfig;
use axum::Router;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

pub use history::{HistoryRecord, HistoryStore, InMemoryHistory, NewHistoryRecord};
pub use state::AppState;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration and shared state
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        let mut app = Router::new();

        // Health check
        if config.health.enabled {
            app = app.route(&config.health.path, axum::routing::get(health::health_handler));
        }

        app = app.merge(api::api_router().with_state(state));

        // Static UI
        if let Some(dir) = &config.ui_dir {
            if !dir.is_dir() {
                tracing::warn!(dir = %dir.display(), "ui directory not found, only the API is served");
            }
            let assets = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
            app = app.fallback_service(assets);
        }

        // Apply middleware layers (innermost first)
        app = app.layer(TraceLayer::new_for_http());
        app = app.layer(CorsLayer::permissive());

        Self {
            router: app,
            listen_address: config.listen_address,
        }
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use aidraw_config::MemoryConfigStore;
    use axum::body::Body;
    use http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    fn state() -> AppState {
        AppState::with_config_store(Arc::new(MemoryConfigStore::default()))
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn health_responds() {
        let router = Server::new(ServerConfig::default(), state()).into_router();
        assert_eq!(get(router, "/health").await, (StatusCode::OK, "ok".to_owned()));
    }

    #[tokio::test]
    async fn health_can_be_disabled() {
        let mut config = ServerConfig::default();
        config.health.enabled = false;

        let router = Server::new(config, state()).into_router();
        assert_eq!(get(router, "/health").await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn ui_assets_fall_back_to_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>draw</html>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();

        let config = ServerConfig {
            ui_dir: Some(dir.path().to_path_buf()),
            ..ServerConfig::default()
        };
        let router = Server::new(config, state()).into_router();

        assert_eq!(get(router.clone(), "/app.js").await.1, "console.log(1)");
        assert_eq!(get(router.clone(), "/history").await.1, "<html>draw</html>");

        let (status, body) = get(router, "/api/models").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("hunyuan-rapid"));
    }
}
