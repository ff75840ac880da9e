//! Hugging Face Inference API provider.
//!
//! Posts the prompt to a hosted diffusion model and receives raw image
//! bytes, which the orchestrator persists to the image cache.

use super::provider::{request_error, sniff_extension, ImageProvider, ImageReference};
use crate::error::ProviderError;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

const PROVIDER_NAME: &str = "huggingface";

/// Hugging Face text-to-image provider.
pub struct HuggingFaceProvider {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
    timeout: Duration,
}

impl HuggingFaceProvider {
    pub fn new(endpoint: &str, api_key: Option<&str>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            api_key: api_key.map(String::from),
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// Classify a non-success status from the inference API.
///
/// The upstream body is logged, never returned, so it cannot reach clients.
fn status_error(status: u16) -> ProviderError {
    if status == 503 {
        ProviderError::ModelLoading {
            provider: "Hugging Face".to_string(),
        }
    } else {
        ProviderError::Http {
            status,
            message: format!("HuggingFace API error: {status}"),
        }
    }
}

#[async_trait]
impl ImageProvider for HuggingFaceProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn generate(&self, prompt: &str) -> Result<ImageReference, ProviderError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&InferenceRequest { inputs: prompt })
            .timeout(self.timeout);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let resp = request
            .send()
            .await
            .map_err(|e| request_error(PROVIDER_NAME, e, self.timeout))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            tracing::debug!("HuggingFace {status} body: {text}");
            return Err(status_error(status.as_u16()));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| request_error(PROVIDER_NAME, e, self.timeout))?;
        if bytes.is_empty() {
            return Err(ProviderError::InvalidResponse(
                "HuggingFace returned an empty body".to_string(),
            ));
        }

        Ok(ImageReference::Bytes {
            extension: sniff_extension(&bytes),
            data: bytes.to_vec(),
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
