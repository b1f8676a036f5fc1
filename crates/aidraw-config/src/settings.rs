use aidraw_imagegen::ProviderConfig;
use serde::{Deserialize, Serialize};

/// Default provider id
pub const DEFAULT_PROVIDER: &str = "hunyuan";

/// Default vendor region
pub const DEFAULT_REGION: &str = "ap-guangzhou";

/// Persisted credentials, stored as camelCase JSON
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub secret_id: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            secret_id: String::new(),
            secret_key: String::new(),
            region: default_region(),
        }
    }
}

impl Settings {
    /// Whether both halves of the key pair are present
    pub fn has_credentials(&self) -> bool {
        !self.secret_id.is_empty() && !self.secret_key.is_empty()
    }

    /// Credentials for the image library, `None` until both keys are set
    pub fn provider_config(&self) -> Option<ProviderConfig> {
        self.has_credentials()
            .then(|| ProviderConfig::new(self.secret_id.clone(), self.secret_key.clone(), self.region.clone()))
    }

    /// Display form with the secret hidden
    pub fn masked(&self) -> MaskedSettings {
        let secret_id = if self.secret_id.is_empty() {
            String::new()
        } else {
            format!("{}***", self.secret_id.chars().take(8).collect::<String>())
        };

        MaskedSettings {
            provider: self.provider.clone(),
            secret_id,
            secret_key: mask(&self.secret_key),
            region: self.region.clone(),
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("provider", &self.provider)
            .field("secret_id", &self.secret_id)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

/// [`Settings`] safe to print or send to a browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskedSettings {
    pub provider: String,
    pub secret_id: String,
    pub secret_key: String,
    pub region: String,
}

fn mask(secret: &str) -> String {
    if secret.is_empty() { String::new() } else { "***".to_owned() }
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_owned()
}

fn default_region() -> String {
    DEFAULT_REGION.to_owned()
}
