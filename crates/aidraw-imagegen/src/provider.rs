pub(crate) mod hunyuan;
mod tc3;
mod tencent_cloud;

use async_trait::async_trait;

use crate::{
    error::Result,
    types::{GenerateRequest, GenerateResult, JobRequest, JobStatus, SubmittedJob},
};

/// Trait for image generation provider implementations
#[async_trait]
pub trait ImageGenProvider: Send + Sync {
    /// Generate one image synchronously
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResult>;

    /// Asynchronous job capability, `None` when unsupported
    fn async_jobs(&self) -> Option<&dyn AsyncJobs> {
        None
    }

    /// Get the provider name
    fn name(&self) -> &str;
}

/// Submit/poll job capability
#[async_trait]
pub trait AsyncJobs: Send + Sync {
    async fn submit(&self, request: &JobRequest) -> Result<SubmittedJob>;

    async fn query(&self, job_id: &str) -> Result<JobStatus>;
}
