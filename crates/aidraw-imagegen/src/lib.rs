//! Unified text-to-image interface
//!
//! Frontends call the facade functions in this module with a provider id and
//! caller-owned credentials. Every operation returns an [`Envelope`]: failures
//! are reported in it rather than as `Err`, so callers need no error branches.

#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod error;
mod provider;
mod registry;
mod types;

use strum::IntoEnumIterator;

pub use error::{ErrorKind, ImageGenError, Result};
pub use provider::{AsyncJobs, ImageGenProvider, hunyuan::SubModel};
pub use registry::ProviderKind;
pub use types::{
    DEFAULT_RESOLUTION, Envelope, GenerateParams, GenerateRequest, GenerateResult, JobRequest, JobState, JobStatus,
    ModelInfo, ProviderConfig, ProviderInfo, QueryParams, RspImgType, SubmitParams, SubmittedJob,
};

/// Generate an image synchronously
pub async fn generate_image(params: GenerateParams) -> Envelope<GenerateResult> {
    let GenerateParams {
        provider,
        config,
        request,
    } = params;

    let result = match resolve(&provider, config) {
        Ok(adapter) => adapter.generate(&request).await,
        Err(e) => Err(e),
    };

    log_outcome("generate", &provider, &result);
    Envelope::from_result(provider, result)
}

/// Submit an asynchronous generation job
pub async fn submit_image_job(params: SubmitParams) -> Envelope<SubmittedJob> {
    let SubmitParams {
        provider,
        config,
        request,
    } = params;

    let result = match resolve(&provider, config) {
        Ok(adapter) => submit_with(adapter.as_ref(), &request).await,
        Err(e) => Err(e),
    };

    log_outcome("submit", &provider, &result);
    Envelope::from_result(provider, result)
}

/// Query the state of an asynchronous job
pub async fn query_image_job(params: QueryParams) -> Envelope<JobStatus> {
    let QueryParams {
        provider,
        job_id,
        config,
    } = params;

    let result = match resolve(&provider, config) {
        Ok(adapter) => query_with(adapter.as_ref(), &job_id).await,
        Err(e) => Err(e),
    };

    log_outcome("query", &provider, &result);
    Envelope::from_result(provider, result).with_job_id(job_id)
}

/// Registered providers
pub fn supported_providers() -> Vec<ProviderInfo> {
    ProviderKind::iter().map(ProviderKind::info).collect()
}

/// Sub-models across all registered providers
pub fn supported_models() -> Vec<ModelInfo> {
    ProviderKind::iter().flat_map(ProviderKind::models).collect()
}

/// Check credentials, then resolve and build the adapter
fn resolve(provider: &str, config: Option<ProviderConfig>) -> Result<Box<dyn ImageGenProvider>> {
    let config = config.ok_or(ImageGenError::MissingConfig)?;
    let kind = ProviderKind::parse(provider)?;
    Ok(kind.build(config))
}

async fn submit_with(provider: &dyn ImageGenProvider, request: &JobRequest) -> Result<SubmittedJob> {
    let jobs = provider
        .async_jobs()
        .ok_or_else(|| ImageGenError::UnsupportedCapability {
            provider: provider.name().to_owned(),
            capability: "asynchronous job submission",
        })?;

    jobs.submit(request).await
}

async fn query_with(provider: &dyn ImageGenProvider, job_id: &str) -> Result<JobStatus> {
    let jobs = provider
        .async_jobs()
        .ok_or_else(|| ImageGenError::UnsupportedCapability {
            provider: provider.name().to_owned(),
            capability: "asynchronous job query",
        })?;

    jobs.query(job_id).await
}

fn log_outcome<T>(operation: &str, provider: &str, result: &Result<T>) {
    match result {
        Ok(_) => tracing::debug!(operation, provider, "image operation succeeded"),
        Err(e) => tracing::warn!(operation, provider, error = %e, kind = %e.kind(), "image operation failed"),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    /// Adapter with synchronous generation only
    struct SyncOnly;

    #[async_trait]
    impl ImageGenProvider for SyncOnly {
        async fn generate(&self, _request: &GenerateRequest) -> Result<GenerateResult> {
            Ok(GenerateResult::from_payload(Some("https://x/a.png".to_owned()), "r1".to_owned()))
        }

        fn name(&self) -> &str {
            "sync-only"
        }
    }

    #[tokio::test]
    async fn submit_requires_capability() {
        let err = submit_with(&SyncOnly, &JobRequest::default()).await.unwrap_err();

        assert!(matches!(err, ImageGenError::UnsupportedCapability { .. }));
        assert!(err.to_string().contains("sync-only"));
    }

    #[tokio::test]
    async fn query_requires_capability() {
        let err = query_with(&SyncOnly, "J1").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnsupportedCapability);
        assert!(err.to_string().contains("sync-only"));
    }

    #[tokio::test]
    async fn missing_config_fails_every_operation() {
        let generated = generate_image(GenerateParams {
            provider: "hunyuan".to_owned(),
            ..GenerateParams::default()
        })
        .await;
        assert!(!generated.success);
        assert_eq!(generated.error_kind, Some(ErrorKind::MissingConfig));

        let submitted = submit_image_job(SubmitParams {
            provider: "hunyuan".to_owned(),
            ..SubmitParams::default()
        })
        .await;
        assert_eq!(submitted.error_kind, Some(ErrorKind::MissingConfig));

        let queried = query_image_job(QueryParams {
            provider: "hunyuan".to_owned(),
            job_id: "J1".to_owned(),
            config: None,
        })
        .await;
        assert_eq!(queried.error_kind, Some(ErrorKind::MissingConfig));
        assert_eq!(queried.job_id.as_deref(), Some("J1"));
    }

    #[tokio::test]
    async fn missing_config_wins_over_unknown_provider() {
        let envelope = generate_image(GenerateParams {
            provider: "tongyi".to_owned(),
            ..GenerateParams::default()
        })
        .await;

        assert_eq!(envelope.error_kind, Some(ErrorKind::MissingConfig));
    }

    #[tokio::test]
    async fn unknown_provider_is_reported() {
        let envelope = generate_image(GenerateParams {
            provider: "tongyi".to_owned(),
            config: Some(ProviderConfig::new("X", "Y", "ap-guangzhou")),
            ..GenerateParams::default()
        })
        .await;

        assert!(!envelope.success);
        assert_eq!(envelope.provider, "tongyi");
        assert_eq!(envelope.error_kind, Some(ErrorKind::UnknownProvider));
    }

    #[test]
    fn introspection() {
        assert_eq!(
            supported_providers(),
            [ProviderInfo {
                id: "hunyuan",
                name: "Tencent Hunyuan",
                supports_async: true,
            }]
        );
        assert_eq!(supported_models().len(), 4);
    }
}
