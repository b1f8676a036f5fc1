use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use url::Url;

use super::tc3::{CONTENT_TYPE, Tc3Signer};
use crate::{
    error::{ImageGenError, Result},
    types::ProviderConfig,
};

/// One Tencent Cloud API family (service name, version, public endpoint)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Service {
    pub name: &'static str,
    pub version: &'static str,
    pub endpoint: &'static str,
}

pub(crate) const HUNYUAN: Service = Service {
    name: "hunyuan",
    version: "2023-09-01",
    endpoint: "https://hunyuan.tencentcloudapi.com",
};

pub(crate) const AIART: Service = Service {
    name: "aiart",
    version: "2022-12-29",
    endpoint: "https://aiart.tencentcloudapi.com",
};

/// Signed JSON client for a single Tencent Cloud service
pub(crate) struct TencentCloudClient {
    http: Client,
    service: Service,
    url: Url,
    host: String,
    region: String,
    signer: Tc3Signer,
}

impl TencentCloudClient {
    pub fn new(service: Service, config: &ProviderConfig) -> Result<Self> {
        let url = match &config.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => Url::parse(service.endpoint)
                .map_err(|e| ImageGenError::ClientInit(format!("invalid {} endpoint: {e}", service.name)))?,
        };

        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_owned(),
            (None, _) => {
                return Err(ImageGenError::ClientInit(format!("endpoint {url} has no host")));
            }
        };

        let http = Client::builder()
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| ImageGenError::ClientInit(e.to_string()))?;

        Ok(Self {
            http,
            service,
            url,
            host,
            region: config.region.clone(),
            signer: Tc3Signer::new(config.secret_id.clone(), config.secret_key.clone(), service.name),
        })
    }

    /// Invoke `action` with a JSON body and decode the `Response` member
    pub async fn call<Req, Resp>(&self, action: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let payload =
            serde_json::to_vec(request).map_err(|e| ImageGenError::InvalidRequest(format!("unserializable request: {e}")))?;

        let timestamp = jiff::Timestamp::now().as_second();
        let authorization = self.signer.authorization(&self.host, action, &payload, timestamp)?;

        tracing::debug!(service = self.service.name, action, "calling vendor API");

        let mut builder = self
            .http
            .post(self.url.clone())
            .header("Authorization", authorization)
            .header("Content-Type", CONTENT_TYPE)
            .header("Host", &self.host)
            .header("X-TC-Action", action)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("X-TC-Version", self.service.version);

        if !self.region.is_empty() {
            builder = builder.header("X-TC-Region", &self.region);
        }

        let response = builder.body(payload).send().await.map_err(|e| {
            tracing::error!(service = self.service.name, action, error = %e, "vendor request failed");
            ImageGenError::Connection(format!("{} {action}: {e}", self.service.name))
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(service = self.service.name, action, %status, "vendor API returned HTTP error");
        }

        decode_response(&body).inspect_err(|e| {
            tracing::error!(service = self.service.name, action, error = %e, "vendor call failed");
        })
    }
}

/// Wire envelope: every answer is wrapped in `{"Response": {...}}`
#[derive(Deserialize)]
struct ApiEnvelope<T> {
    #[serde(rename = "Response")]
    response: ApiBody<T>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ApiBody<T> {
    Error {
        #[serde(rename = "Error")]
        error: ApiError,
        #[serde(rename = "RequestId", default)]
        request_id: String,
    },
    Ok(T),
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Message", default)]
    message: String,
}

fn decode_response<T: DeserializeOwned>(body: &str) -> Result<T> {
    let envelope: ApiEnvelope<T> = serde_json::from_str(body).map_err(|e| {
        let snippet: String = body.chars().take(200).collect();
        ImageGenError::InvalidResponse(format!("{e}: {snippet}"))
    })?;

    match envelope.response {
        ApiBody::Ok(data) => Ok(data),
        ApiBody::Error { error, request_id } => Err(ImageGenError::Vendor {
            code: error.code,
            message: error.message,
            request_id,
        }),
    }
}
