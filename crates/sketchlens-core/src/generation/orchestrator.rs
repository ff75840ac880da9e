//! Sequential provider fallback for image generation.
//!
//! Providers are tried in configured order. The first success wins; each
//! failure (error or timeout) is logged and recorded, and the next provider
//! is attempted. Calls never overlap.

use super::cache::ImageCache;
use super::prompt::build_prompt;
use super::provider::{ImageProvider, ImageReference, ProviderFactory};
use crate::config::Config;
use crate::error::{ProviderError, ServiceError, ServiceResult};
use crate::types::{GenerationOutcome, ProviderAttempt, Style};
use std::sync::Arc;

const FAILURE_MESSAGE: &str = "Image generation failed";

/// Runs the configured provider chain for a label and style.
pub struct GenerationOrchestrator {
    providers: Vec<Arc<dyn ImageProvider>>,
    cache: ImageCache,
}

impl GenerationOrchestrator {
    pub fn new(providers: Vec<Arc<dyn ImageProvider>>, cache: ImageCache) -> Self {
        Self { providers, cache }
    }

    /// Build the configured chain and cache.
    pub fn from_config(config: &Config) -> Self {
        let providers =
            ProviderFactory::build_chain(&config.generation.providers, &config.providers);
        if providers.is_empty() {
            tracing::warn!("No image providers available; image generation will fail");
        }
        let cache = ImageCache::new(config.cache_dir(), &config.server.static_url_prefix);
        Self::new(providers, cache)
    }

    /// Names of the providers in chain order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Build the prompt for `label` and run it through the chain.
    ///
    /// `style` is resolved leniently; unknown identifiers use the realistic
    /// template.
    pub async fn generate(&self, label: &str, style: &str) -> ServiceResult<GenerationOutcome> {
        let label = label.trim();
        if label.is_empty() {
            return Err(ServiceError::InvalidInput(
                "No prediction provided".to_string(),
            ));
        }

        let prompt = build_prompt(label, Style::resolve(style));
        tracing::info!("Generating image for '{label}' ({style})");
        self.run_chain(&prompt).await
    }

    /// Try each provider in turn with `prompt`.
    pub async fn run_chain(&self, prompt: &str) -> ServiceResult<GenerationOutcome> {
        if self.providers.is_empty() {
            return Err(ServiceError::OrchestrationFailure {
                message: FAILURE_MESSAGE.to_string(),
                details: "No image providers configured".to_string(),
                attempts: Vec::new(),
            });
        }

        let mut attempts = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            let name = provider.name();
            match self.attempt(provider.as_ref(), prompt).await {
                Ok(image_reference) => {
                    tracing::info!("Image generated by {name}");
                    return Ok(GenerationOutcome {
                        image_reference,
                        provider_used: name.to_string(),
                        prompt: prompt.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!("Image provider {name} failed: {e}");
                    attempts.push(ProviderAttempt {
                        provider: name.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let details = attempts
            .last()
            .map(|a| format!("{}: {}", a.provider, a.error))
            .unwrap_or_default();
        tracing::error!("All {} image providers failed", attempts.len());
        Err(ServiceError::OrchestrationFailure {
            message: FAILURE_MESSAGE.to_string(),
            details,
            attempts,
        })
    }

    /// One bounded provider call; bytes are persisted before returning.
    async fn attempt(&self, provider: &dyn ImageProvider, prompt: &str) -> Result<String, ProviderError> {
        let timeout = provider.timeout();
        let reference = match tokio::time::timeout(timeout, provider.generate(prompt)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ProviderError::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        };

        match reference {
            ImageReference::Url(url) => Ok(url),
            ImageReference::Bytes { data, extension } => self.cache.store(&data, &extension).await,
        }
    }
}
