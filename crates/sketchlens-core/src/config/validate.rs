//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::generation::KNOWN_PROVIDERS;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.normalizer.input_size == 0 {
            return Err(ConfigError::ValidationError(
                "normalizer.input_size must be > 0".into(),
            ));
        }
        if self.limits.max_payload_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_payload_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.inference_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.inference_timeout_ms must be > 0".into(),
            ));
        }
        for name in &self.generation.providers {
            if !KNOWN_PROVIDERS.contains(&name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "generation.providers contains unknown provider '{name}' (expected one of: {})",
                    KNOWN_PROVIDERS.join(", ")
                )));
            }
        }
        if self.providers.huggingface.timeout_ms == 0
            || self.providers.pollinations.timeout_ms == 0
            || self.providers.openai.timeout_ms == 0
        {
            return Err(ConfigError::ValidationError(
                "providers.*.timeout_ms must be > 0".into(),
            ));
        }
        let prefix = self.server.static_url_prefix.trim_end_matches('/');
        if !prefix.starts_with('/') || prefix.len() < 2 {
            return Err(ConfigError::ValidationError(
                "server.static_url_prefix must be a non-root path starting with '/'".into(),
            ));
        }
        Ok(())
    }
}
