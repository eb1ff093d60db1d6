//! The seam to the remote multimodal API.
//!
//! [`NarrationBackend`] is the crate's only contact surface with a
//! language model: one call that narrates a slide image, one call that
//! extracts structured signal from a narration. The production
//! implementation wraps an `edgequake-llm` provider; tests substitute
//! scripted fakes, which is the whole reason the trait exists — retry,
//! timeout, and context-accumulation logic can be exercised without a
//! network.

use crate::config::NarrationConfig;
use crate::error::{BackendError, DecktalkError};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::debug;

/// Default vision-capable model when the caller names a provider but no
/// model.
const DEFAULT_VISION_MODEL: &str = "gpt-4o-mini";

/// Text plus token usage from one backend call.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Remote calls the narration pipeline depends on.
#[async_trait]
pub trait NarrationBackend: Send + Sync {
    /// Produce free-text commentary for one slide image.
    ///
    /// `image_base64` is the encoded slide; `mime_type` its content type
    /// (e.g. `image/jpeg`).
    async fn narrate_page(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        image_base64: &str,
        mime_type: &str,
    ) -> Result<BackendResponse, BackendError>;

    /// Run a text-only structured-extraction request.
    ///
    /// The returned text is expected to be a JSON object; the caller owns
    /// parsing and treats malformed output as a non-fatal no-op.
    async fn extract_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<BackendResponse, BackendError>;
}

/// Production backend: an `edgequake-llm` provider plus completion knobs.
pub struct LlmBackend {
    provider: Arc<dyn LLMProvider>,
    temperature: Option<f32>,
    max_tokens: usize,
}

impl LlmBackend {
    /// Wrap a pre-constructed provider.
    ///
    /// Useful when the caller needs custom middleware (caching,
    /// rate-limiting) around the provider.
    pub fn new(provider: Arc<dyn LLMProvider>, config: &NarrationConfig) -> Self {
        Self {
            provider,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Resolve a provider from configuration and environment.
    ///
    /// The fallback chain, from most-specific to least-specific:
    ///
    /// 1. **Named provider** (`config.provider_name`) with `config.model`
    ///    or the default vision model. The factory reads the matching API
    ///    key (`OPENAI_API_KEY`, etc.) from the environment.
    /// 2. **Environment pair** `DECKTALK_LLM_PROVIDER` + `DECKTALK_MODEL`,
    ///    both set — a provider choice made at the execution-environment
    ///    level (shell profile, CI job).
    /// 3. **OpenAI key present** — users with several provider keys get
    ///    OpenAI unless they asked for something else.
    /// 4. **Full auto-detection** via `ProviderFactory::from_env()`.
    pub fn from_config(config: &NarrationConfig) -> Result<Self, DecktalkError> {
        if let Some(ref name) = config.provider_name {
            let model = config.model.as_deref().unwrap_or(DEFAULT_VISION_MODEL);
            return Ok(Self::new(create_vision_provider(name, model)?, config));
        }

        if let (Ok(prov), Ok(model)) = (
            std::env::var("DECKTALK_LLM_PROVIDER"),
            std::env::var("DECKTALK_MODEL"),
        ) {
            if !prov.is_empty() && !model.is_empty() {
                return Ok(Self::new(create_vision_provider(&prov, &model)?, config));
            }
        }

        if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
            if !openai_key.is_empty() {
                let model = config.model.as_deref().unwrap_or(DEFAULT_VISION_MODEL);
                return Ok(Self::new(create_vision_provider("openai", model)?, config));
            }
        }

        let (llm_provider, _embedding) =
            ProviderFactory::from_env().map_err(|e| DecktalkError::ProviderNotConfigured {
                provider: "auto".to_string(),
                hint: format!(
                    "No LLM provider could be auto-detected from environment.\n\
                    Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                    Error: {}",
                    e
                ),
            })?;

        Ok(Self::new(llm_provider, config))
    }

    fn options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }
}

#[async_trait]
impl NarrationBackend for LlmBackend {
    async fn narrate_page(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        image_base64: &str,
        mime_type: &str,
    ) -> Result<BackendResponse, BackendError> {
        let image = ImageData::new(image_base64.to_string(), mime_type).with_detail("high");
        let messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user_with_images(user_prompt, vec![image]),
        ];

        let options = self.options();
        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| BackendError(format!("{e}")))?;

        debug!(
            "narration call: {} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );

        Ok(BackendResponse {
            text: response.content,
            input_tokens: response.prompt_tokens as u64,
            output_tokens: response.completion_tokens as u64,
        })
    }

    async fn extract_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<BackendResponse, BackendError> {
        let messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_prompt),
        ];

        // Extraction wants fidelity, not flair: pin the temperature low
        // regardless of the narration setting.
        let options = CompletionOptions {
            temperature: Some(0.1),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| BackendError(format!("{e}")))?;

        Ok(BackendResponse {
            text: response.content,
            input_tokens: response.prompt_tokens as u64,
            output_tokens: response.completion_tokens as u64,
        })
    }
}

/// Instantiate a named provider with the given model.
fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, DecktalkError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        DecktalkError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}
