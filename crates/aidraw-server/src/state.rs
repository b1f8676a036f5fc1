use std::sync::Arc;

use aidraw_config::{ConfigStore, Settings};
use aidraw_imagegen::ProviderConfig;
use url::Url;

use crate::history::{HistoryStore, InMemoryHistory};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    config: Arc<dyn ConfigStore>,
    history: Arc<dyn HistoryStore>,
    vendor_endpoint: Option<Url>,
}

impl AppState {
    pub fn new(config: Arc<dyn ConfigStore>, history: Arc<dyn HistoryStore>) -> Self {
        Self {
            config,
            history,
            vendor_endpoint: None,
        }
    }

    /// State backed by `config` with an empty in-memory history
    pub fn with_config_store(config: Arc<dyn ConfigStore>) -> Self {
        Self::new(config, Arc::new(InMemoryHistory::default()))
    }

    /// Send every vendor call to `endpoint` instead of the public API
    #[must_use]
    pub fn with_vendor_endpoint(mut self, endpoint: Url) -> Self {
        self.vendor_endpoint = Some(endpoint);
        self
    }

    pub fn config_store(&self) -> &dyn ConfigStore {
        self.config.as_ref()
    }

    pub fn history(&self) -> &dyn HistoryStore {
        self.history.as_ref()
    }

    /// Library credentials for `settings`, `None` until keys are configured
    pub fn provider_config(&self, settings: &Settings) -> Option<ProviderConfig> {
        let config = settings.provider_config()?;

        Some(match &self.vendor_endpoint {
            Some(endpoint) => config.with_endpoint(endpoint.clone()),
            None => config,
        })
    }
}
