//! Tencent Hunyuan text-to-image adapter
//!
//! The same capability is exposed through two API families: `hunyuan`
//! (2023-09-01) and `aiart` (2022-12-29). Each logical sub-model picks one
//! family, one action and the subset of optional parameters that action accepts.

use std::sync::OnceLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use super::{
    AsyncJobs, ImageGenProvider,
    tencent_cloud::{AIART, HUNYUAN, Service, TencentCloudClient},
};
use crate::{
    error::{ImageGenError, Result},
    types::{
        DEFAULT_RESOLUTION, GenerateRequest, GenerateResult, JobRequest, JobState, JobStatus, ProviderConfig,
        RspImgType, SubmittedJob,
    },
};

const DEFAULT_JOB_STYLE: &str = "riman";

/// Logical Hunyuan sub-models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, IntoStaticStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum SubModel {
    HunyuanRapid,
    HunyuanLight,
    HunyuanLite,
    HunyuanAsync,
}

/// Which client, action and optional parameters a sub-model maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Route {
    pub service: Service,
    pub action: &'static str,
    pub accepts_seed: bool,
    pub accepts_style: bool,
}

impl SubModel {
    pub(crate) const fn route(self) -> Route {
        match self {
            Self::HunyuanLight => Route {
                service: HUNYUAN,
                action: "TextToImageLite",
                accepts_seed: false,
                accepts_style: true,
            },
            Self::HunyuanLite => Route {
                service: AIART,
                action: "TextToImageLite",
                accepts_seed: true,
                accepts_style: false,
            },
            Self::HunyuanRapid => Route {
                service: AIART,
                action: "TextToImageRapid",
                accepts_seed: true,
                accepts_style: true,
            },
            Self::HunyuanAsync => Route {
                service: HUNYUAN,
                action: "SubmitHunyuanImageJob",
                accepts_seed: true,
                accepts_style: true,
            },
        }
    }

    pub const fn is_async(self) -> bool {
        matches!(self, Self::HunyuanAsync)
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::HunyuanRapid => "Hunyuan Rapid",
            Self::HunyuanLight => "Hunyuan Light",
            Self::HunyuanLite => "Hunyuan Lite",
            Self::HunyuanAsync => "Hunyuan Async",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::HunyuanRapid => "30 styles, fast",
            Self::HunyuanLight => "27 styles, higher quality",
            Self::HunyuanLite => "5 basic styles, fastest",
            Self::HunyuanAsync => "18 styles, suited to batch generation",
        }
    }

    /// Parse a sub-model id, listing every valid id on failure
    pub fn parse(id: &str) -> Result<Self> {
        id.parse().map_err(|_| ImageGenError::UnsupportedSubModel {
            sub_model: id.to_owned(),
            supported: Self::iter().map(|m| m.as_ref().to_owned()).collect::<Vec<_>>().join(", "),
        })
    }
}

/// Wire body shared by `TextToImageLite` and `TextToImageRapid`
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct TextToImageRequest<'a> {
    prompt: &'a str,
    resolution: &'a str,
    rsp_img_type: RspImgType,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    logo_add: Option<i64>,
}

impl<'a> TextToImageRequest<'a> {
    fn new(route: Route, request: &'a GenerateRequest) -> Self {
        Self {
            prompt: &request.prompt,
            resolution: request.resolution.as_deref().unwrap_or(DEFAULT_RESOLUTION),
            rsp_img_type: request.rsp_img_type.unwrap_or_default(),
            seed: request.seed.filter(|_| route.accepts_seed),
            style: request
                .style
                .as_deref()
                .filter(|s| route.accepts_style && !s.is_empty()),
            logo_add: request.logo_add,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TextToImageResponse {
    #[serde(default)]
    result_image: Option<String>,
    request_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SubmitJobRequest<'a> {
    prompt: &'a str,
    resolution: &'a str,
    seed: i64,
    style: &'a str,
    logo_add: i64,
}

impl<'a> SubmitJobRequest<'a> {
    fn new(request: &'a JobRequest) -> Self {
        Self {
            prompt: &request.prompt,
            resolution: request.resolution.as_deref().unwrap_or(DEFAULT_RESOLUTION),
            seed: request.seed.unwrap_or(0),
            style: request
                .style
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_JOB_STYLE),
            logo_add: request.logo_add.unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SubmitJobResponse {
    job_id: String,
    request_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct QueryJobRequest<'a> {
    job_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct QueryJobResponse {
    #[serde(default)]
    job_status_code: Option<StatusCode>,
    #[serde(default)]
    result_image: Option<ImagePayload>,
    #[serde(default)]
    job_error_msg: Option<String>,
    request_id: String,
}

/// Status codes arrive as numbers or numeric strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatusCode {
    Number(i64),
    Text(String),
}

impl StatusCode {
    fn state(&self) -> JobState {
        match self {
            Self::Number(code) => JobState::from_code(*code),
            Self::Text(code) => code.trim().parse().map_or(JobState::Unknown, JobState::from_code),
        }
    }
}

/// Finished jobs report one image or a list of them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImagePayload {
    One(String),
    Many(Vec<String>),
}

impl ImagePayload {
    fn first(self) -> Option<String> {
        let image = match self {
            Self::One(image) => Some(image),
            Self::Many(images) => images.into_iter().next(),
        };
        image.filter(|image| !image.is_empty())
    }
}

/// Hunyuan provider, one instance per set of credentials
pub(crate) struct HunyuanProvider {
    config: ProviderConfig,
    hunyuan: OnceLock<TencentCloudClient>,
    aiart: OnceLock<TencentCloudClient>,
}

impl HunyuanProvider {
    pub const NAME: &'static str = "hunyuan";

    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            hunyuan: OnceLock::new(),
            aiart: OnceLock::new(),
        }
    }

    /// Client for `service`, built on first use
    fn client(&self, service: Service) -> Result<&TencentCloudClient> {
        let cell = if service == AIART { &self.aiart } else { &self.hunyuan };

        if let Some(client) = cell.get() {
            return Ok(client);
        }

        let client = TencentCloudClient::new(service, &self.config)?;

        // A concurrent caller may have won; both handles are equivalent
        Ok(cell.get_or_init(|| client))
    }
}

#[async_trait]
impl ImageGenProvider for HunyuanProvider {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResult> {
        let sub_model = SubModel::parse(&request.sub_model)?;

        if sub_model.is_async() {
            return Err(ImageGenError::InvalidRequest(format!(
                "sub-model '{sub_model}' runs as an asynchronous job, submit it as a job instead"
            )));
        }

        let route = sub_model.route();
        let client = self.client(route.service)?;
        let body = TextToImageRequest::new(route, request);

        tracing::debug!(
            provider = Self::NAME,
            %sub_model,
            action = route.action,
            "sending image generation request"
        );

        let response: TextToImageResponse = client.call(route.action, &body).await?;

        tracing::debug!(provider = Self::NAME, request_id = %response.request_id, "image generation complete");

        Ok(GenerateResult::from_payload(response.result_image, response.request_id))
    }

    fn async_jobs(&self) -> Option<&dyn AsyncJobs> {
        Some(self)
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}

#[async_trait]
impl AsyncJobs for HunyuanProvider {
    async fn submit(&self, request: &JobRequest) -> Result<SubmittedJob> {
        let route = SubModel::HunyuanAsync.route();
        let client = self.client(route.service)?;

        let response: SubmitJobResponse = client.call(route.action, &SubmitJobRequest::new(request)).await?;

        tracing::debug!(provider = Self::NAME, job_id = %response.job_id, "image job submitted");

        Ok(SubmittedJob {
            job_id: response.job_id,
            request_id: response.request_id,
        })
    }

    async fn query(&self, job_id: &str) -> Result<JobStatus> {
        let client = self.client(HUNYUAN)?;

        let response: QueryJobResponse = client
            .call("QueryHunyuanImageJob", &QueryJobRequest { job_id })
            .await?;

        let status = response
            .job_status_code
            .as_ref()
            .map_or(JobState::Unknown, StatusCode::state);

        if status == JobState::Failed {
            tracing::warn!(
                provider = Self::NAME,
                job_id,
                reason = response.job_error_msg.as_deref().unwrap_or_default(),
                "image job failed"
            );
        }

        Ok(JobStatus {
            status,
            image_url: response.result_image.and_then(ImagePayload::first),
            request_id: response.request_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn request(sub_model: &str) -> GenerateRequest {
        GenerateRequest {
            sub_model: sub_model.to_owned(),
            prompt: "a cat".to_owned(),
            resolution: Some("768:768".to_owned()),
            seed: Some(42),
            style: Some("201".to_owned()),
            logo_add: Some(0),
            rsp_img_type: None,
        }
    }

    fn wire(sub_model: SubModel, request: &GenerateRequest) -> serde_json::Value {
        serde_json::to_value(TextToImageRequest::new(sub_model.route(), request)).unwrap()
    }

    fn provider(server: &MockServer) -> HunyuanProvider {
        let config = ProviderConfig::new("X", "Y", "ap-guangzhou").with_endpoint(Url::parse(&server.uri()).unwrap());
        HunyuanProvider::new(config)
    }

    #[test]
    fn dispatch_table() {
        let light = SubModel::HunyuanLight.route();
        assert_eq!((light.service, light.action), (HUNYUAN, "TextToImageLite"));
        assert!(!light.accepts_seed && light.accepts_style);

        let lite = SubModel::HunyuanLite.route();
        assert_eq!((lite.service, lite.action), (AIART, "TextToImageLite"));
        assert!(lite.accepts_seed && !lite.accepts_style);

        let rapid = SubModel::HunyuanRapid.route();
        assert_eq!((rapid.service, rapid.action), (AIART, "TextToImageRapid"));
        assert!(rapid.accepts_seed && rapid.accepts_style);

        let job = SubModel::HunyuanAsync.route();
        assert_eq!((job.service, job.action), (HUNYUAN, "SubmitHunyuanImageJob"));
        assert!(job.accepts_seed && job.accepts_style);
    }

    #[test]
    fn light_drops_seed() {
        assert_eq!(
            wire(SubModel::HunyuanLight, &request("hunyuan-light")),
            json!({"Prompt": "a cat", "Resolution": "768:768", "RspImgType": "url", "Style": "201", "LogoAdd": 0})
        );
    }

    #[test]
    fn lite_drops_style() {
        assert_eq!(
            wire(SubModel::HunyuanLite, &request("hunyuan-lite")),
            json!({"Prompt": "a cat", "Resolution": "768:768", "RspImgType": "url", "Seed": 42, "LogoAdd": 0})
        );
    }

    #[test]
    fn rapid_keeps_everything() {
        assert_eq!(
            wire(SubModel::HunyuanRapid, &request("hunyuan-rapid")),
            json!({
                "Prompt": "a cat", "Resolution": "768:768", "RspImgType": "url",
                "Seed": 42, "Style": "201", "LogoAdd": 0
            })
        );
    }

    #[test]
    fn defaults_fill_resolution_and_type() {
        let request = GenerateRequest {
            sub_model: "hunyuan-rapid".to_owned(),
            prompt: "a dog".to_owned(),
            style: Some(String::new()),
            ..GenerateRequest::default()
        };

        assert_eq!(
            wire(SubModel::HunyuanRapid, &request),
            json!({"Prompt": "a dog", "Resolution": "1024:1024", "RspImgType": "url"})
        );
    }

    #[test]
    fn job_defaults() {
        let request = JobRequest {
            prompt: "a fox".to_owned(),
            style: Some(String::new()),
            ..JobRequest::default()
        };

        assert_eq!(
            serde_json::to_value(SubmitJobRequest::new(&request)).unwrap(),
            json!({"Prompt": "a fox", "Resolution": "1024:1024", "Seed": 0, "Style": "riman", "LogoAdd": 0})
        );
    }

    #[test]
    fn unknown_sub_model_lists_all_valid_ids() {
        let err = SubModel::parse("bogus-model").unwrap_err();
        let message = err.to_string();

        for id in ["hunyuan-light", "hunyuan-lite", "hunyuan-rapid", "hunyuan-async"] {
            assert!(message.contains(id), "{message}");
        }
        assert!(message.contains("bogus-model"));
    }

    #[test]
    fn status_codes_accept_numbers_and_strings() {
        let parse = |v: serde_json::Value| serde_json::from_value::<StatusCode>(v).unwrap().state();

        assert_eq!(parse(json!(2)), JobState::Success);
        assert_eq!(parse(json!("1")), JobState::Processing);
        assert_eq!(parse(json!("-1")), JobState::Failed);
        assert_eq!(parse(json!("done")), JobState::Unknown);
        assert_eq!(parse(json!(99)), JobState::Unknown);
    }

    #[tokio::test]
    async fn rapid_calls_aiart() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("X-TC-Action", "TextToImageRapid"))
            .and(header("X-TC-Version", "2022-12-29"))
            .and(header("X-TC-Region", "ap-guangzhou"))
            .and(body_json(json!({"Prompt": "a cat", "Resolution": "1024:1024", "RspImgType": "url"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Response": {"ResultImage": "https://x/a.png", "RequestId": "r1"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = GenerateRequest {
            sub_model: "hunyuan-rapid".to_owned(),
            prompt: "a cat".to_owned(),
            resolution: Some("1024:1024".to_owned()),
            ..GenerateRequest::default()
        };

        let result = provider(&server).generate(&request).await.unwrap();

        assert_eq!(
            result,
            GenerateResult {
                image_url: Some("https://x/a.png".to_owned()),
                image_base64: None,
                request_id: "r1".to_owned(),
            }
        );
    }

    #[tokio::test]
    async fn light_calls_hunyuan_and_returns_base64() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("X-TC-Action", "TextToImageLite"))
            .and(header("X-TC-Version", "2023-09-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Response": {"ResultImage": "iVBORw0KGgo=", "RequestId": "r2"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = provider(&server).generate(&request("hunyuan-light")).await.unwrap();

        assert!(result.image_url.is_none());
        assert_eq!(result.image_base64.as_deref(), Some("iVBORw0KGgo="));
    }

    #[tokio::test]
    async fn async_sub_model_is_not_generated() {
        let server = MockServer::start().await;

        let err = provider(&server).generate(&request("hunyuan-async")).await.unwrap_err();

        assert!(matches!(err, ImageGenError::InvalidRequest(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn vendor_error_propagates() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Response": {
                    "Error": {"Code": "ResourceUnavailable.NotExist", "Message": "service not enabled"},
                    "RequestId": "r3"
                }
            })))
            .mount(&server)
            .await;

        let err = provider(&server).generate(&request("hunyuan-lite")).await.unwrap_err();

        assert!(matches!(err, ImageGenError::Vendor { ref code, .. } if code == "ResourceUnavailable.NotExist"));
    }

    #[tokio::test]
    async fn submit_and_query_job() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("X-TC-Action", "SubmitHunyuanImageJob"))
            .and(body_json(json!({
                "Prompt": "a fox", "Resolution": "1024:1024", "Seed": 0, "Style": "riman", "LogoAdd": 0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Response": {"JobId": "J1", "RequestId": "r4"}
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(header("X-TC-Action", "QueryHunyuanImageJob"))
            .and(body_json(json!({"JobId": "J1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Response": {"JobStatusCode": "2", "ResultImage": ["https://x/b.png"], "RequestId": "r5"}
            })))
            .mount(&server)
            .await;

        let provider = provider(&server);
        let jobs = provider.async_jobs().unwrap();

        let job = jobs
            .submit(&JobRequest {
                prompt: "a fox".to_owned(),
                ..JobRequest::default()
            })
            .await
            .unwrap();
        assert_eq!(job.job_id, "J1");

        let status = jobs.query(&job.job_id).await.unwrap();
        assert_eq!(status.status, JobState::Success);
        assert_eq!(status.image_url.as_deref(), Some("https://x/b.png"));
        assert_eq!(status.request_id, "r5");
    }

    #[tokio::test]
    async fn clients_are_built_once() {
        let server = MockServer::start().await;
        let provider = provider(&server);

        let first: *const TencentCloudClient = provider.client(AIART).unwrap();
        let second: *const TencentCloudClient = provider.client(AIART).unwrap();
        let other: *const TencentCloudClient = provider.client(HUNYUAN).unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn failed_client_build_is_not_memoised() {
        let config = ProviderConfig::new("X", "Y", "ap-guangzhou").with_endpoint(Url::parse("unix:/tmp/x").unwrap());
        let provider = HunyuanProvider::new(config);

        for _ in 0..2 {
            let err = provider.client(HUNYUAN).err().unwrap();
            assert!(matches!(err, ImageGenError::ClientInit(_)));
            assert!(err.to_string().contains("no host"), "{err}");
        }
        assert!(provider.hunyuan.get().is_none());
    }
}
