//! Test server wrapper that starts the web UI backend on a random port

use std::{net::SocketAddr, sync::Arc};

use aidraw_config::{MemoryConfigStore, ServerConfig, Settings};
use aidraw_server::{AppState, Server};
use tokio_util::sync::CancellationToken;
use url::Url;

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
    store: Arc<MemoryConfigStore>,
}

impl TestServer {
    /// Start with the given settings, vendor calls going to `vendor` when set
    pub async fn start(settings: Settings, vendor: Option<Url>) -> anyhow::Result<Self> {
        Self::start_with(ServerConfig::default(), settings, vendor).await
    }

    /// Start with explicit server options
    ///
    /// Binds to port 0 for automatic port assignment
    pub async fn start_with(config: ServerConfig, settings: Settings, vendor: Option<Url>) -> anyhow::Result<Self> {
        let store = Arc::new(MemoryConfigStore::new(settings));

        let mut state = AppState::with_config_store(store.clone());
        if let Some(endpoint) = vendor {
            state = state.with_vendor_endpoint(endpoint);
        }

        let server = Server::new(config, state);
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        // Bind the listener here so we know the actual port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            shutdown,
            client: reqwest::Client::new(),
            store,
        })
    }

    /// Base URL of the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Config store backing the server
    pub fn store(&self) -> &MemoryConfigStore {
        &self.store
    }

    /// GET `path` and decode the JSON body
    pub async fn get_json(&self, path: &str) -> serde_json::Value {
        self.client
            .get(self.url(path))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    /// POST `body` to `path` and decode the JSON body
    pub async fn post_json(&self, path: &str, body: serde_json::Value) -> serde_json::Value {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Settings with credentials filled in
pub fn configured() -> Settings {
    Settings {
        secret_id: "AKIDintegration".to_owned(),
        secret_key: "integration-key".to_owned(),
        ..Settings::default()
    }
}
