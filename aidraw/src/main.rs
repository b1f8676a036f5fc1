#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod output;

use std::{net::SocketAddr, process::ExitCode, sync::Arc};

use aidraw_config::{ConfigStore, FileConfigStore, LoggingConfig, ServerConfig, Settings};
use aidraw_imagegen::{GenerateParams, GenerateRequest, JobRequest, QueryParams, SubModel, SubmitParams};
use aidraw_server::{AppState, Server};
use anyhow::Context;
use args::{Args, Command, ConfigAction, GenerateArgs};
use clap::Parser;
use output::Outcome;
use serde_json::json;
use tokio_util::sync::CancellationToken;

const CREDENTIALS_MISSING: &str = "configure SecretId and SecretKey first (aidraw config set)";

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let logging = LoggingConfig {
        filter: args.log.clone(),
        format: args.log_format,
    };
    if let Err(e) = aidraw_telemetry::init(&logging) {
        eprintln!("{e}");
    }

    let outcome = run(args).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "command failed");
        Outcome::failure(format!("{e:#}"))
    });

    outcome.print()
}

async fn run(args: Args) -> anyhow::Result<Outcome> {
    let store = config_store(&args)?;

    match args.command {
        Command::Config { action } => configure(&store, action),
        Command::Generate(generate_args) => generate(&store, generate_args).await,
        Command::Submit(job) => submit(&store, job.into()).await,
        Command::Query { job_id } => query(&store, job_id).await,
        Command::Providers => Outcome::success(&json!({
            "success": true,
            "providers": aidraw_imagegen::supported_providers(),
        })),
        Command::Models => Outcome::success(&json!({
            "success": true,
            "models": aidraw_imagegen::supported_models(),
        })),
        Command::Serve { port, ui_dir } => serve(store, port, ui_dir).await,
    }
}

fn config_store(args: &Args) -> anyhow::Result<FileConfigStore> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => FileConfigStore::default_path().context("cannot locate the home directory, pass --config")?,
    };

    Ok(FileConfigStore::new(path))
}

fn configure(store: &FileConfigStore, action: ConfigAction) -> anyhow::Result<Outcome> {
    match action {
        ConfigAction::Set {
            secret_id,
            secret_key,
            region,
            provider,
        } => {
            // Reject unknown providers before anything is written
            aidraw_imagegen::ProviderKind::parse(&provider)?;

            let settings = Settings {
                provider,
                secret_id,
                secret_key,
                region,
            };
            store.save(&settings)?;
            tracing::info!(path = %store.path().display(), "config saved");

            Outcome::success(&json!({
                "success": true,
                "path": store.path().display().to_string(),
                "config": settings.masked(),
            }))
        }
        ConfigAction::Show => {
            let settings = store.load()?;
            Outcome::success(&json!({ "success": true, "config": settings.masked() }))
        }
    }
}

async fn generate(store: &FileConfigStore, args: GenerateArgs) -> anyhow::Result<Outcome> {
    let settings = store.load()?;
    let Some(config) = settings.provider_config() else {
        return Ok(Outcome::failure(CREDENTIALS_MISSING));
    };

    if SubModel::parse(&args.model).is_ok_and(SubModel::is_async) {
        tracing::info!(model = %args.model, "job-based model, submitting instead");
        return submit(store, args.job.into()).await;
    }

    let envelope = aidraw_imagegen::generate_image(GenerateParams {
        provider: settings.provider,
        config: Some(config),
        request: GenerateRequest {
            sub_model: args.model,
            prompt: args.job.prompt,
            resolution: args.job.resolution,
            seed: args.job.seed,
            style: args.job.style,
            logo_add: args.job.logo_add,
            rsp_img_type: args.rsp_img_type,
        },
    })
    .await;

    let mut outcome = Outcome::from_envelope(&envelope)?;

    if let (Some(path), Some(result)) = (&args.output, &envelope.data) {
        // The image was generated either way, a failed save is only reported
        match output::save_image(path, result).await {
            Ok(()) => outcome.insert("savedTo", json!(path.display().to_string())),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to save image");
                outcome.insert("saveError", json!(format!("{e:#}")));
            }
        }
    }

    Ok(outcome)
}

async fn submit(store: &FileConfigStore, request: JobRequest) -> anyhow::Result<Outcome> {
    let settings = store.load()?;
    let Some(config) = settings.provider_config() else {
        return Ok(Outcome::failure(CREDENTIALS_MISSING));
    };

    let envelope = aidraw_imagegen::submit_image_job(SubmitParams {
        provider: settings.provider,
        config: Some(config),
        request,
    })
    .await;

    Outcome::from_envelope(&envelope)
}

async fn query(store: &FileConfigStore, job_id: String) -> anyhow::Result<Outcome> {
    let settings = store.load()?;
    let Some(config) = settings.provider_config() else {
        return Ok(Outcome::failure(CREDENTIALS_MISSING));
    };

    let envelope = aidraw_imagegen::query_image_job(QueryParams {
        provider: settings.provider,
        job_id,
        config: Some(config),
    })
    .await;

    Outcome::from_envelope(&envelope)
}

async fn serve(store: FileConfigStore, port: u16, ui_dir: Option<std::path::PathBuf>) -> anyhow::Result<Outcome> {
    let config = ServerConfig {
        listen_address: SocketAddr::from(([127, 0, 0, 1], port)),
        ui_dir,
        ..ServerConfig::default()
    };

    tracing::info!(
        config_path = %store.path().display(),
        address = %config.listen_address,
        "starting aidraw web ui"
    );

    let state = AppState::with_config_store(Arc::new(store));
    let server = Server::new(config, state);

    // Set up graceful shutdown
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    server.serve(shutdown).await?;

    tracing::info!("aidraw stopped");
    Outcome::success(&json!({ "success": true }))
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
