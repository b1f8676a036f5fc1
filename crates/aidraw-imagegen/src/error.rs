use strum::Display;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImageGenError>;

/// Image generation errors
///
/// Every variant is caught at the facade and turned into a failed
/// [`Envelope`](crate::Envelope); none of them escapes to frontends as a panic.
#[derive(Debug, Error)]
pub enum ImageGenError {
    /// Caller did not supply provider credentials
    #[error("missing provider config")]
    MissingConfig,

    /// Provider id is not registered
    #[error("unsupported provider '{provider}', supported: {supported}")]
    UnknownProvider { provider: String, supported: String },

    /// Sub-model is not one the provider dispatches
    #[error("unsupported sub-model '{sub_model}', supported: {supported}")]
    UnsupportedSubModel { sub_model: String, supported: String },

    /// Provider does not implement the requested operation
    #[error("provider '{provider}' does not support {capability}")]
    UnsupportedCapability {
        provider: String,
        capability: &'static str,
    },

    /// Request is well-formed but cannot be served as asked
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Vendor API rejected the call
    #[error("vendor error {code}: {message} (request {request_id})")]
    Vendor {
        code: String,
        message: String,
        request_id: String,
    },

    /// Network or transport failure talking to the vendor
    #[error("connection error: {0}")]
    Connection(String),

    /// Vendor answered with something we could not read
    #[error("invalid vendor response: {0}")]
    InvalidResponse(String),

    /// Vendor client could not be constructed
    #[error("failed to initialize vendor client: {0}")]
    ClientInit(String),
}

/// Machine-readable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, serde::Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingConfig,
    UnknownProvider,
    UnsupportedSubModel,
    UnsupportedCapability,
    InvalidRequest,
    VendorCallFailure,
    MissingDependency,
}

impl ImageGenError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingConfig => ErrorKind::MissingConfig,
            Self::UnknownProvider { .. } => ErrorKind::UnknownProvider,
            Self::UnsupportedSubModel { .. } => ErrorKind::UnsupportedSubModel,
            Self::UnsupportedCapability { .. } => ErrorKind::UnsupportedCapability,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::Vendor { .. } | Self::Connection(_) | Self::InvalidResponse(_) => ErrorKind::VendorCallFailure,
            Self::ClientInit(_) => ErrorKind::MissingDependency,
        }
    }
}

impl From<reqwest::Error> for ImageGenError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Connection(err.to_string())
        }
    }
}
