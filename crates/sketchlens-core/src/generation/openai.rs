//! OpenAI Images API provider.
//!
//! Requests base64 output so the image lands in the local cache instead of
//! pointing callers at a short-lived signed URL.

use super::provider::{request_error, sniff_extension, ImageProvider, ImageReference};
use crate::error::ProviderError;
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER_NAME: &str = "openai";

/// OpenAI provider using the Images generation endpoint.
pub struct OpenAiImageProvider {
    api_key: String,
    model: String,
    size: String,
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl OpenAiImageProvider {
    pub fn new(endpoint: &str, api_key: &str, model: &str, size: &str, timeout: Duration) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            size: size.to_string(),
            client: reqwest::Client::new(),
            endpoint: format!("{}/images/generations", endpoint.trim_end_matches('/')),
            timeout,
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ImagesRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    response_format: &'a str,
}

// --- Response types ---

#[derive(Deserialize)]
struct ImagesResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    b64_json: Option<String>,
    url: Option<String>,
}

fn into_reference(resp: ImagesResponse) -> Result<ImageReference, ProviderError> {
    let first = resp.data.into_iter().next().ok_or_else(|| {
        ProviderError::InvalidResponse("OpenAI returned empty data array".to_string())
    })?;

    if let Some(b64) = first.b64_json {
        let data = base64::engine::general_purpose::STANDARD
            .decode(b64.as_bytes())
            .map_err(|e| ProviderError::InvalidResponse(format!("bad base64 image: {e}")))?;
        return Ok(ImageReference::Bytes {
            extension: sniff_extension(&data),
            data,
        });
    }

    first.url.map(ImageReference::Url).ok_or_else(|| {
        ProviderError::InvalidResponse("OpenAI returned neither b64_json nor url".to_string())
    })
}

#[async_trait]
impl ImageProvider for OpenAiImageProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn generate(&self, prompt: &str) -> Result<ImageReference, ProviderError> {
        let body = ImagesRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: &self.size,
            response_format: "b64_json",
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| request_error(PROVIDER_NAME, e, self.timeout))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            tracing::debug!("OpenAI {status} body: {text}");
            return Err(ProviderError::Http {
                status: status.as_u16(),
                message: format!("OpenAI API error: {}", status.as_u16()),
            });
        }

        let images: ImagesResponse = resp.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse OpenAI response: {e}"))
        })?;

        into_reference(images)
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::test_server::{self, PNG_MAGIC};
    use axum::{
        http::{HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};

    async fn provider_for(router: Router) -> OpenAiImageProvider {
        let base = test_server::spawn(router).await;
        OpenAiImageProvider::new(
            &format!("{base}/v1"),
            "sk-test",
            "dall-e-2",
            "256x256",
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_b64_payload_becomes_bytes() {
        let png_magic = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        let resp: ImagesResponse = serde_json::from_value(serde_json::json!({
            "data": [{ "b64_json": base64::engine::general_purpose::STANDARD.encode(png_magic) }]
        }))
        .unwrap();
        match into_reference(resp).unwrap() {
            ImageReference::Bytes { data, extension } => {
                assert_eq!(data, png_magic);
                assert_eq!(extension, "png");
            }
            other => panic!("expected bytes, got {other:?}"),
        }
    }

    #[test]
    fn test_url_payload_passes_through() {
        let resp: ImagesResponse = serde_json::from_value(serde_json::json!({
            "data": [{ "url": "https://cdn.example.com/a.png" }]
        }))
        .unwrap();
        assert_eq!(
            into_reference(resp).unwrap(),
            ImageReference::Url("https://cdn.example.com/a.png".to_string())
        );
    }

    #[test]
    fn test_empty_data_is_invalid() {
        let resp: ImagesResponse =
            serde_json::from_value(serde_json::json!({ "data": [] })).unwrap();
        assert!(matches!(
            into_reference(resp),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_endpoint_join() {
        let provider = OpenAiImageProvider::new(
            "https://api.openai.com/v1/",
            "sk-test",
            "dall-e-2",
            "512x512",
            Duration::from_secs(60),
        );
        assert_eq!(
            provider.endpoint,
            "https://api.openai.com/v1/images/generations"
        );
    }

    #[tokio::test]
    async fn test_generate_decodes_b64_image() {
        let router = Router::new().route(
            "/v1/images/generations",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer sk-test");
                assert_eq!(body["response_format"], "b64_json");
                assert_eq!(body["size"], "256x256");
                Json(json!({
                    "data": [{ "b64_json": base64::engine::general_purpose::STANDARD.encode(PNG_MAGIC) }]
                }))
            }),
        );
        let provider = provider_for(router).await;

        match provider.generate("a tree").await.unwrap() {
            ImageReference::Bytes { data, extension } => {
                assert_eq!(data, PNG_MAGIC);
                assert_eq!(extension, "png");
            }
            other => panic!("expected bytes, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_error_status_hides_upstream_body() {
        let router = Router::new().route(
            "/v1/images/generations",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "rate limited for org-secret") }),
        );
        let provider = provider_for(router).await;

        let err = provider.generate("a tree").await.unwrap_err();
        assert_eq!(
            err,
            ProviderError::Http {
                status: 429,
                message: "OpenAI API error: 429".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_generate_malformed_json_is_invalid() {
        let router = Router::new().route(
            "/v1/images/generations",
            post(|| async { "not json" }),
        );
        let provider = provider_for(router).await;

        let err = provider.generate("a tree").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }
}
