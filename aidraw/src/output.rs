use std::{path::Path, process::ExitCode};

use aidraw_imagegen::{Envelope, GenerateResult};
use anyhow::Context;
use base64::Engine;
use serde::Serialize;
use serde_json::{Map, Value};

/// JSON object printed on stdout when a command finishes
#[derive(Debug)]
pub struct Outcome {
    success: bool,
    body: Map<String, Value>,
}

impl Outcome {
    pub fn success(body: &impl Serialize) -> anyhow::Result<Self> {
        Ok(Self {
            success: true,
            body: into_object(body)?,
        })
    }

    pub fn failure(error: impl Into<String>) -> Self {
        let mut body = Map::new();
        body.insert("success".to_owned(), Value::Bool(false));
        body.insert("error".to_owned(), Value::String(error.into()));

        Self { success: false, body }
    }

    pub fn from_envelope<T: Serialize>(envelope: &Envelope<T>) -> anyhow::Result<Self> {
        Ok(Self {
            success: envelope.success,
            body: into_object(envelope)?,
        })
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.body.insert(key.to_owned(), value);
    }

    /// Print the body and map success to the process exit code
    pub fn print(self) -> ExitCode {
        match serde_json::to_string_pretty(&self.body) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("failed to encode output: {e}");
                return ExitCode::FAILURE;
            }
        }

        if self.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

fn into_object(body: &impl Serialize) -> anyhow::Result<Map<String, Value>> {
    match serde_json::to_value(body)? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("expected a JSON object, got {other}"),
    }
}

/// Write a generated image to `path`, downloading it when only a URL came back
pub async fn save_image(path: &Path, result: &GenerateResult) -> anyhow::Result<()> {
    let bytes = if let Some(encoded) = &result.image_base64 {
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .context("image payload is not valid base64")?
    } else if let Some(url) = &result.image_url {
        tracing::debug!(%url, "downloading image");
        reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    } else {
        anyhow::bail!("response carried no image");
    };

    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }

    std::fs::write(path, &bytes).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), size = bytes.len(), "image saved");

    Ok(())
}
