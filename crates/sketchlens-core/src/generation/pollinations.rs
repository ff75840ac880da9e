//! Pollinations provider.
//!
//! Pollinations renders an image for any prompt-bearing URL, so the provider
//! only probes the URL and returns it as a hosted reference.

use super::provider::{request_error, ImageProvider, ImageReference};
use crate::error::ProviderError;
use async_trait::async_trait;
use std::time::Duration;

const PROVIDER_NAME: &str = "pollinations";

/// Pollinations URL-based provider.
pub struct PollinationsProvider {
    endpoint: String,
    width: u32,
    height: u32,
    client: reqwest::Client,
    timeout: Duration,
}

impl PollinationsProvider {
    pub fn new(endpoint: &str, width: u32, height: u32, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            width,
            height,
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// Build the image URL; `timestamp` busts upstream caching.
    pub fn image_url(&self, prompt: &str, timestamp: i64) -> String {
        format!(
            "{}/prompt/{}?width={}&height={}&nologo=true&timestamp={}",
            self.endpoint,
            urlencoding::encode(prompt),
            self.width,
            self.height,
            timestamp
        )
    }
}

#[async_trait]
impl ImageProvider for PollinationsProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn generate(&self, prompt: &str) -> Result<ImageReference, ProviderError> {
        let url = self.image_url(prompt, chrono::Utc::now().timestamp());

        let resp = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| request_error(PROVIDER_NAME, e, self.timeout))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                message: format!("Pollinations returned {status}"),
            });
        }

        Ok(ImageReference::Url(url))
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
