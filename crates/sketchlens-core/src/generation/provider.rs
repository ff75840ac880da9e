//! Image provider trait, result types, and the factory that builds the chain.

use crate::config::ProvidersConfig;
use crate::error::{ConfigError, ProviderError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Provider identifiers accepted in `generation.providers`.
pub const KNOWN_PROVIDERS: &[&str] = &["huggingface", "pollinations", "openai"];

/// What a provider hands back for a prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageReference {
    /// Hosted image; passed through to callers unchanged
    Url(String),
    /// Raw image bytes that must be persisted to the cache
    Bytes { data: Vec<u8>, extension: String },
}

/// Trait that all text-to-image providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the chain holds `Arc<dyn ImageProvider>`).
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Provider name reported as `method` in responses (e.g., "pollinations").
    fn name(&self) -> &str;

    /// Generate one image for the prompt.
    async fn generate(&self, prompt: &str) -> Result<ImageReference, ProviderError>;

    /// Upper bound on how long the orchestrator waits for this provider.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Map a transport error from reqwest onto the provider taxonomy.
pub(crate) fn request_error(provider: &str, err: reqwest::Error, timeout: Duration) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        }
    } else {
        ProviderError::Network(format!("{provider} request failed: {err}"))
    }
}

/// Pick a file extension for generated bytes by sniffing their format.
pub(crate) fn sniff_extension(bytes: &[u8]) -> String {
    image::guess_format(bytes)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or("png")
        .to_string()
}

/// Factory that creates providers from their identifiers and config.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a single provider by name.
    pub fn create(
        name: &str,
        config: &ProvidersConfig,
    ) -> Result<Arc<dyn ImageProvider>, ConfigError> {
        match name {
            "huggingface" => {
                let cfg = &config.huggingface;
                let token = resolve_env_var(&cfg.api_key);
                Ok(Arc::new(super::huggingface::HuggingFaceProvider::new(
                    &cfg.endpoint,
                    token.as_deref(),
                    Duration::from_millis(cfg.timeout_ms),
                )))
            }
            "pollinations" => {
                let cfg = &config.pollinations;
                Ok(Arc::new(super::pollinations::PollinationsProvider::new(
                    &cfg.endpoint,
                    cfg.width,
                    cfg.height,
                    Duration::from_millis(cfg.timeout_ms),
                )))
            }
            "openai" => {
                let cfg = &config.openai;
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    ConfigError::ValidationError(
                        "OpenAI API key not set. Set OPENAI_API_KEY env var.".to_string(),
                    )
                })?;
                Ok(Arc::new(super::openai::OpenAiImageProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    &cfg.model,
                    &cfg.size,
                    Duration::from_millis(cfg.timeout_ms),
                )))
            }
            other => Err(ConfigError::ValidationError(format!(
                "Unknown image provider: {other}"
            ))),
        }
    }

    /// Build the ordered chain, skipping providers that cannot be constructed.
    pub fn build_chain(names: &[String], config: &ProvidersConfig) -> Vec<Arc<dyn ImageProvider>> {
        let mut chain = Vec::with_capacity(names.len());
        for name in names {
            match Self::create(name, config) {
                Ok(provider) => chain.push(provider),
                Err(e) => tracing::warn!("Skipping image provider '{name}': {e}"),
            }
        }
        chain
    }
}
