use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::json;

use crate::{
    config::Config,
    error::{AppError, Result},
    models::AspectRatio,
};

/// Seam between the pipeline and the external text-to-image provider.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, aspect_ratio: AspectRatio) -> Result<Vec<u8>>;
}

/// OpenAI-compatible images endpoint. Wraps exactly one call per generation;
/// any failure surfaces as `GenerationFailed` with no partial result.
pub struct OpenAiImageClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
}

impl OpenAiImageClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config
            .image_api_base_url
            .clone()
            .ok_or_else(|| AppError::GenerationFailed("image API base URL not configured".into()))?;
        let api_key = config
            .image_api_key
            .clone()
            .ok_or_else(|| AppError::GenerationFailed("image API key not configured".into()))?;

        Ok(Self::new(base_url, api_key, config.image_model.clone()))
    }

    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageClient {
    async fn generate(&self, prompt: &str, aspect_ratio: AspectRatio) -> Result<Vec<u8>> {
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "n": 1,
            "size": aspect_ratio.output_size(),
        });

        let response = self
            .http
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::GenerationFailed(format!("provider request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::GenerationFailed(format!(
                "provider returned status {}",
                status
            )));
        }

        let parsed: ImagesResponse = response
            .json()
            .await
            .map_err(|e| AppError::GenerationFailed(format!("unparseable provider response: {}", e)))?;

        let b64 = parsed
            .data
            .first()
            .and_then(|d| d.b64_json.as_deref())
            .ok_or_else(|| AppError::GenerationFailed("empty provider response".into()))?;

        STANDARD
            .decode(b64)
            .map_err(|e| AppError::GenerationFailed(format!("invalid image payload: {}", e)))
    }
}

/// Stand-in used when no provider credentials are configured. Every call
/// fails, so the pipeline rejects generation before charging anyone.
pub struct UnconfiguredImageClient;

#[async_trait]
impl ImageGenerator for UnconfiguredImageClient {
    async fn generate(&self, _prompt: &str, _aspect_ratio: AspectRatio) -> Result<Vec<u8>> {
        Err(AppError::GenerationFailed(
            "image provider is not configured".into(),
        ))
    }
}
