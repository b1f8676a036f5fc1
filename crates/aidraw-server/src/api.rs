use aidraw_config::{DEFAULT_PROVIDER, DEFAULT_REGION, MaskedSettings, Settings};
use aidraw_imagegen::{
    GenerateParams, GenerateRequest, JobRequest, ModelInfo, ProviderInfo, ProviderKind, QueryParams, RspImgType,
    SubModel, SubmitParams,
};
use axum::{
    Json, Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, Failure},
    extract::{ApiJson, ApiPath},
    history::{HistoryRecord, NewHistoryRecord},
    state::AppState,
};

/// Sub-model used when a request names none
const DEFAULT_MODEL: &str = "hunyuan-rapid";

/// Placeholder the UI receives instead of the stored secret key
const MASKED_SECRET: &str = "***";

const CREDENTIALS_MISSING: &str = "configure SecretId and SecretKey first";

type ApiResult = Result<Response, ApiError>;

/// JSON API consumed by the web UI
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/config", get(get_config).post(save_config))
        .route("/api/config/test", post(test_config))
        .route("/api/generate", post(generate))
        .route("/api/jobs", post(submit_job))
        .route("/api/jobs/{job_id}", get(query_job))
        .route("/api/providers", get(providers))
        .route("/api/models", get(models))
        .route("/api/history", get(list_history))
        .route("/api/history/{id}", delete(delete_history))
}

#[derive(Serialize)]
struct ConfigResponse {
    success: bool,
    config: MaskedSettings,
}

async fn get_config(State(state): State<AppState>) -> ApiResult {
    let settings = state.config_store().load()?;

    Ok(Json(ConfigResponse {
        success: true,
        config: settings.masked(),
    })
    .into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigBody {
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    secret_id: String,
    #[serde(default)]
    secret_key: String,
    #[serde(default)]
    region: Option<String>,
}

#[derive(Serialize)]
struct Ack {
    success: bool,
}

const ACK: Ack = Ack { success: true };

async fn save_config(State(state): State<AppState>, ApiJson(body): ApiJson<ConfigBody>) -> ApiResult {
    let store = state.config_store();

    // The UI echoes the masked key back when only other fields changed
    let secret_key = if body.secret_key == MASKED_SECRET {
        store.load()?.secret_key
    } else {
        body.secret_key
    };

    let settings = Settings {
        provider: body
            .provider
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_owned()),
        secret_id: body.secret_id,
        secret_key,
        region: body
            .region
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_owned()),
    };

    if let Err(e) = store.save(&settings) {
        tracing::error!(error = %e, "failed to save config");
        return Ok(Failure::new(format!("failed to save config: {e}")).into_response());
    }

    tracing::info!(provider = %settings.provider, region = %settings.region, "config updated");
    Ok(Json(ACK).into_response())
}

async fn test_config(ApiJson(body): ApiJson<ConfigBody>) -> Response {
    let provider = body.provider.unwrap_or_default();

    match ProviderKind::parse(&provider) {
        Ok(_) => Json(ACK).into_response(),
        Err(e) => Failure::new(e.to_string()).into_response(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody {
    prompt: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    resolution: Option<String>,
    #[serde(default)]
    style: Option<String>,
    #[serde(default)]
    tags: Option<String>,
    #[serde(default)]
    seed: Option<i64>,
    #[serde(default)]
    logo_add: Option<i64>,
    #[serde(default)]
    rsp_img_type: Option<RspImgType>,
}

impl GenerateBody {
    fn job_request(&self) -> JobRequest {
        JobRequest {
            prompt: self.prompt.clone(),
            resolution: self.resolution.clone(),
            seed: self.seed,
            style: self.style.clone(),
            logo_add: self.logo_add,
        }
    }
}

/// Generate with the stored credentials
///
/// Job-based sub-models are submitted instead and answer with a `jobId`.
async fn generate(State(state): State<AppState>, ApiJson(body): ApiJson<GenerateBody>) -> ApiResult {
    let settings = state.config_store().load()?;

    let Some(config) = state.provider_config(&settings) else {
        return Ok(Failure::new(CREDENTIALS_MISSING).into_response());
    };

    let model = body
        .model
        .clone()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL.to_owned());

    if SubModel::parse(&model).is_ok_and(SubModel::is_async) {
        let envelope = aidraw_imagegen::submit_image_job(SubmitParams {
            provider: settings.provider,
            config: Some(config),
            request: body.job_request(),
        })
        .await;

        return Ok(Json(envelope).into_response());
    }

    let envelope = aidraw_imagegen::generate_image(GenerateParams {
        provider: settings.provider,
        config: Some(config),
        request: GenerateRequest {
            sub_model: model.clone(),
            prompt: body.prompt.clone(),
            resolution: body.resolution.clone(),
            seed: body.seed,
            style: body.style.clone(),
            logo_add: body.logo_add,
            rsp_img_type: body.rsp_img_type,
        },
    })
    .await;

    if let Some(result) = &envelope.data {
        let record = state.history().add(NewHistoryRecord {
            prompt: body.prompt,
            model,
            resolution: body.resolution,
            style: body.style,
            tags: body.tags,
            image_url: result.image_url.clone(),
        });
        tracing::debug!(id = record.id, "generation recorded");
    }

    Ok(Json(envelope).into_response())
}

async fn submit_job(State(state): State<AppState>, ApiJson(request): ApiJson<JobRequest>) -> ApiResult {
    let settings = state.config_store().load()?;

    let Some(config) = state.provider_config(&settings) else {
        return Ok(Failure::new(CREDENTIALS_MISSING).into_response());
    };

    let envelope = aidraw_imagegen::submit_image_job(SubmitParams {
        provider: settings.provider,
        config: Some(config),
        request,
    })
    .await;

    Ok(Json(envelope).into_response())
}

async fn query_job(State(state): State<AppState>, ApiPath(job_id): ApiPath<String>) -> ApiResult {
    let settings = state.config_store().load()?;

    let Some(config) = state.provider_config(&settings) else {
        return Ok(Failure::new(CREDENTIALS_MISSING).into_response());
    };

    let envelope = aidraw_imagegen::query_image_job(QueryParams {
        provider: settings.provider,
        job_id,
        config: Some(config),
    })
    .await;

    Ok(Json(envelope).into_response())
}

#[derive(Serialize)]
struct ProvidersResponse {
    success: bool,
    providers: Vec<ProviderInfo>,
}

async fn providers() -> Json<ProvidersResponse> {
    Json(ProvidersResponse {
        success: true,
        providers: aidraw_imagegen::supported_providers(),
    })
}

#[derive(Serialize)]
struct ModelsResponse {
    success: bool,
    models: Vec<ModelInfo>,
}

async fn models() -> Json<ModelsResponse> {
    Json(ModelsResponse {
        success: true,
        models: aidraw_imagegen::supported_models(),
    })
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    #[serde(default)]
    tag: Option<String>,
}

#[derive(Serialize)]
struct HistoryResponse {
    success: bool,
    records: Vec<HistoryRecord>,
}

async fn list_history(State(state): State<AppState>, Query(query): Query<HistoryQuery>) -> Json<HistoryResponse> {
    let tag = query.tag.as_deref().filter(|t| !t.is_empty());

    Json(HistoryResponse {
        success: true,
        records: state.history().list(tag),
    })
}

async fn delete_history(State(state): State<AppState>, ApiPath(id): ApiPath<u64>) -> Json<Ack> {
    if !state.history().delete(id) {
        tracing::debug!(id, "history record already gone");
    }
    Json(ACK)
}
