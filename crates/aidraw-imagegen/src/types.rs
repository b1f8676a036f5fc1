use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

use crate::error::{ErrorKind, ImageGenError};

/// Default output resolution, `W:H`
pub const DEFAULT_RESOLUTION: &str = "1024:1024";

/// Credentials and routing for one provider
///
/// Supplied by the caller on every call; the library never persists it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub secret_id: String,
    pub secret_key: SecretString,
    #[serde(default)]
    pub region: String,
    /// Base URL override for every vendor API family
    #[serde(default)]
    pub endpoint: Option<Url>,
}

impl ProviderConfig {
    pub fn new(secret_id: impl Into<String>, secret_key: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key: SecretString::from(secret_key.into()),
            region: region.into(),
            endpoint: None,
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }
}

/// How the vendor should hand back the image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RspImgType {
    #[default]
    Url,
    Base64,
}

/// Synchronous generation request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Provider-specific sub-model id (e.g. `hunyuan-rapid`)
    pub sub_model: String,
    pub prompt: String,
    /// `W:H`, defaults to [`DEFAULT_RESOLUTION`]
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub seed: Option<i64>,
    #[serde(default)]
    pub style: Option<String>,
    /// 1 adds the vendor watermark, 0 omits it
    #[serde(default)]
    pub logo_add: Option<i64>,
    #[serde(default)]
    pub rsp_img_type: Option<RspImgType>,
}

/// Generated image, exactly one of `image_url`/`image_base64` is set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResult {
    pub image_url: Option<String>,
    pub image_base64: Option<String>,
    pub request_id: String,
}

impl GenerateResult {
    /// Classify a vendor image payload as a URL or an inline base64 body
    pub fn from_payload(payload: Option<String>, request_id: String) -> Self {
        let (image_url, image_base64) = match payload {
            Some(p) if p.starts_with("http") => (Some(p), None),
            Some(p) if !p.is_empty() => (None, Some(p)),
            _ => (None, None),
        };

        Self {
            image_url,
            image_base64,
            request_id,
        }
    }
}

/// Asynchronous job submission
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub prompt: String,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub seed: Option<i64>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub logo_add: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedJob {
    pub job_id: String,
    pub request_id: String,
}

/// Lifecycle state of an asynchronous job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Processing,
    Success,
    Failed,
    Unknown,
}

impl JobState {
    /// Map a vendor job status code
    pub const fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Processing,
            2 => Self::Success,
            -1 => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub status: JobState,
    pub image_url: Option<String>,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub supports_async: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub provider: &'static str,
    pub description: &'static str,
}

/// Facade parameters for [`generate_image`](crate::generate_image)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateParams {
    pub provider: String,
    #[serde(default)]
    pub config: Option<ProviderConfig>,
    #[serde(flatten)]
    pub request: GenerateRequest,
}

/// Facade parameters for [`submit_image_job`](crate::submit_image_job)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitParams {
    pub provider: String,
    #[serde(default)]
    pub config: Option<ProviderConfig>,
    #[serde(flatten)]
    pub request: JobRequest,
}

/// Facade parameters for [`query_image_job`](crate::query_image_job)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    pub provider: String,
    pub job_id: String,
    #[serde(default)]
    pub config: Option<ProviderConfig>,
}

/// Tagged outcome returned by every facade operation
///
/// Serializes flat: `{success, provider, jobId?, ...data, error?, errorKind?}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl<T> Envelope<T> {
    pub fn ok(provider: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            provider: provider.into(),
            job_id: None,
            data: Some(data),
            error: None,
            error_kind: None,
        }
    }

    pub fn fail(provider: impl Into<String>, error: &ImageGenError) -> Self {
        Self {
            success: false,
            provider: provider.into(),
            job_id: None,
            data: None,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }

    pub(crate) fn from_result(provider: impl Into<String>, result: crate::Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(provider, data),
            Err(e) => Self::fail(provider, &e),
        }
    }

    #[must_use]
    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    /// Payload on success, error message on failure
    pub fn into_result(self) -> std::result::Result<T, String> {
        match (self.data, self.error) {
            (Some(data), None) => Ok(data),
            (_, error) => Err(error.unwrap_or_else(|| "unknown error".to_owned())),
        }
    }
}
