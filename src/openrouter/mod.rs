pub mod encoder;
pub mod extractor;
pub mod gateway;
pub mod request_builder;

use crate::{
    config::OpenRouterConfig,
    error::{GenerationError, Result},
    logger,
    models::{
        is_supported_model, GenerateForm, GenerationRequest, GenerationResult, RequestOrigin,
        DEFAULT_IMAGE_MODEL,
    },
};
use std::sync::Arc;
use uuid::Uuid;

pub use encoder::{encode_image, encode_images};
pub use extractor::extract_images;
pub use gateway::{Attribution, HttpGateway, UpstreamGateway};
pub use request_builder::{build_payload, MAX_UPSTREAM_IMAGES};

pub const EMPTY_RESULT_MESSAGE: &str = "No images returned. Make sure your prompt requests an image output and the model supports image generation.";

/// Where a single generate call currently is. A failure is logged together with
/// the stage it happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Validating,
    Encoding,
    Calling,
    Extracting,
    Responding,
}

/// Runs the generate pipeline: validate, encode, call upstream, extract.
/// Holds no per-request state, so one instance serves concurrent requests.
#[derive(Clone)]
pub struct ImageEditService {
    config: OpenRouterConfig,
    gateway: Arc<dyn UpstreamGateway>,
}

impl ImageEditService {
    pub fn new(config: OpenRouterConfig) -> Self {
        Self::with_gateway(config, Arc::new(HttpGateway::new()))
    }

    pub fn with_gateway(config: OpenRouterConfig, gateway: Arc<dyn UpstreamGateway>) -> Self {
        Self { config, gateway }
    }

    pub fn config(&self) -> &OpenRouterConfig {
        &self.config
    }

    /// Fails with `ConfigError` when no upstream credential is configured.
    pub fn api_key(&self) -> Result<&str> {
        self.config.api_key.as_deref().ok_or_else(|| {
            GenerationError::ConfigError("Missing OPENROUTER_API_KEY in server configuration".into())
        })
    }

    /// Checks run in a fixed order and the first failure wins.
    pub fn validate(&self, form: GenerateForm) -> Result<GenerationRequest> {
        self.api_key()?;

        let prompt = form.prompt.as_deref().unwrap_or("").trim().to_string();
        if prompt.is_empty() {
            return Err(GenerationError::InvalidInput("Missing prompt".into()));
        }

        if form.images.is_empty() {
            return Err(GenerationError::InvalidInput("Missing images".into()));
        }

        let model_id = form
            .model
            .as_deref()
            .unwrap_or(DEFAULT_IMAGE_MODEL)
            .trim()
            .to_string();
        if !is_supported_model(&model_id) {
            return Err(GenerationError::UnsupportedModel("Unsupported model".into()));
        }

        Ok(GenerationRequest {
            prompt,
            model_id,
            images: form.images,
        })
    }

    pub async fn generate(
        &self,
        form: GenerateForm,
        origin: &RequestOrigin,
    ) -> Result<GenerationResult> {
        let request_id = Uuid::new_v4().to_string();
        let mut stage = Stage::Idle;

        let outcome = self.run(&request_id, &mut stage, form, origin).await;
        match &outcome {
            Ok(result) => log::info!(
                "[req:{}] returned {} image(s)",
                request_id,
                result.images.len()
            ),
            Err(e) => log::warn!(
                "[req:{}] failed during {:?} ({}): {}",
                request_id,
                stage,
                e.status_code(),
                e
            ),
        }
        outcome
    }

    async fn run(
        &self,
        request_id: &str,
        stage: &mut Stage,
        form: GenerateForm,
        origin: &RequestOrigin,
    ) -> Result<GenerationResult> {
        *stage = Stage::Validating;
        let mut request = self.validate(form)?;
        let api_key = self.api_key()?;

        *stage = Stage::Encoding;
        let uploaded = request.images.len();
        let forwarded: Vec<_> = std::mem::take(&mut request.images)
            .into_iter()
            .take(MAX_UPSTREAM_IMAGES)
            .collect();
        if forwarded.len() < uploaded {
            log::info!(
                "[req:{}] forwarding {} of {} images",
                request_id,
                forwarded.len(),
                uploaded
            );
        }
        let parts = encode_images(forwarded).await?;

        *stage = Stage::Calling;
        let payload = build_payload(&request, parts);
        let attribution = Attribution::resolve(&self.config, origin);
        let response = {
            let _timer = logger::timer(&format!("[req:{}] OpenRouter completion", request_id));
            self.gateway
                .complete(api_key, &attribution, &payload)
                .await?
        };

        *stage = Stage::Extracting;
        let images = extract_images(response.as_ref());
        if images.is_empty() {
            return Err(GenerationError::EmptyResult(EMPTY_RESULT_MESSAGE.into()));
        }

        *stage = Stage::Responding;
        Ok(GenerationResult { images })
    }
}
