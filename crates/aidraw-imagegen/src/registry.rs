//! Closed set of providers and their constructors

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{
    error::{ImageGenError, Result},
    provider::{
        ImageGenProvider,
        hunyuan::{HunyuanProvider, SubModel},
    },
    types::{ModelInfo, ProviderConfig, ProviderInfo},
};

/// Registered image generation providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, IntoStaticStr, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ProviderKind {
    Hunyuan,
}

impl ProviderKind {
    /// Resolve a provider id, listing registered ids on failure
    pub fn parse(id: &str) -> Result<Self> {
        id.parse().map_err(|_| ImageGenError::UnknownProvider {
            provider: id.to_owned(),
            supported: Self::iter().map(|p| p.as_ref().to_owned()).collect::<Vec<_>>().join(", "),
        })
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Hunyuan => "Tencent Hunyuan",
        }
    }

    /// Whether instances expose [`AsyncJobs`](crate::AsyncJobs)
    pub const fn supports_async(self) -> bool {
        match self {
            Self::Hunyuan => true,
        }
    }

    /// Construct an adapter for these credentials
    ///
    /// Cheap: vendor clients are created on first use.
    pub fn build(self, config: ProviderConfig) -> Box<dyn ImageGenProvider> {
        match self {
            Self::Hunyuan => Box::new(HunyuanProvider::new(config)),
        }
    }

    /// Sub-models this provider dispatches
    pub fn models(self) -> Vec<ModelInfo> {
        match self {
            Self::Hunyuan => SubModel::iter()
                .map(|m| ModelInfo {
                    id: m.into(),
                    name: m.display_name(),
                    provider: self.into(),
                    description: m.description(),
                })
                .collect(),
        }
    }

    pub fn info(self) -> ProviderInfo {
        ProviderInfo {
            id: self.into(),
            name: self.display_name(),
            supports_async: self.supports_async(),
        }
    }
}
