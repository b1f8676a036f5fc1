use std::path::PathBuf;

use aidraw_config::{DEFAULT_PORT, DEFAULT_PROVIDER, DEFAULT_REGION, LogFormat};
use aidraw_imagegen::{JobRequest, RspImgType};
use clap::{Args as ClapArgs, Parser, Subcommand};

/// Text-to-image generation with Tencent Hunyuan
#[derive(Debug, Parser)]
#[command(name = "aidraw", version, about = "Text-to-image generation with Tencent Hunyuan")]
pub struct Args {
    /// Path to the credentials file [default: ~/.najie/ai-draw/config.json]
    #[arg(short, long, global = true, env = "AIDRAW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter directive, logs go to stderr
    #[arg(long, global = true, default_value = "warn", env = "AIDRAW_LOG")]
    pub log: String,

    /// Log line format (text or json)
    #[arg(long, global = true, default_value_t = LogFormat::Text, env = "AIDRAW_LOG_FORMAT")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage stored credentials
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Generate an image, job-based models are submitted instead
    Generate(GenerateArgs),
    /// Submit an asynchronous generation job
    Submit(JobArgs),
    /// Query an asynchronous generation job
    Query {
        #[arg(long, alias = "jobId")]
        job_id: String,
    },
    /// List supported providers
    Providers,
    /// List supported models
    Models,
    /// Start the local web UI
    Serve {
        #[arg(short, long, default_value_t = DEFAULT_PORT, env = "AIDRAW_PORT")]
        port: u16,

        /// Built UI assets to serve next to the API
        #[arg(long, env = "AIDRAW_UI_DIR")]
        ui_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Save credentials
    Set {
        #[arg(long, alias = "secretId")]
        secret_id: String,

        #[arg(long, alias = "secretKey")]
        secret_key: String,

        #[arg(long, default_value = DEFAULT_REGION)]
        region: String,

        #[arg(long, default_value = DEFAULT_PROVIDER)]
        provider: String,
    },
    /// Print saved settings with the secret key masked
    Show,
}

/// Prompt and options shared by generation and job submission
#[derive(Debug, Clone, ClapArgs)]
pub struct JobArgs {
    #[arg(short, long)]
    pub prompt: String,

    /// `W:H`, e.g. 1024:1024
    #[arg(short, long)]
    pub resolution: Option<String>,

    #[arg(short, long)]
    pub style: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    pub seed: Option<i64>,

    /// 1 adds the vendor watermark
    #[arg(long, alias = "logoAdd")]
    pub logo_add: Option<i64>,
}

impl From<JobArgs> for JobRequest {
    fn from(args: JobArgs) -> Self {
        Self {
            prompt: args.prompt,
            resolution: args.resolution,
            seed: args.seed,
            style: args.style,
            logo_add: args.logo_add,
        }
    }
}

#[derive(Debug, Clone, ClapArgs)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// Sub-model id
    #[arg(short, long, default_value = "hunyuan-rapid")]
    pub model: String,

    /// `url` or `base64`
    #[arg(long, alias = "rspImgType")]
    pub rsp_img_type: Option<RspImgType>,

    /// Write the image to this path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
