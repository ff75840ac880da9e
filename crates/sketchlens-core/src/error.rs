//! Error types for SketchLens.
//!
//! Startup failures (configuration, model artifact) are kept apart from
//! per-request failures so request handlers can map a [`ServiceError`] to a
//! client or server fault without inspecting message strings.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::ProviderAttempt;

/// Top-level error type for SketchLens startup and setup operations.
#[derive(Error, Debug)]
pub enum SketchError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Model artifact errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while loading or running the trained classifier artifact.
#[derive(Error, Debug)]
pub enum ModelError {
    /// A required artifact file is missing
    #[error("Model artifact not found: {0}")]
    NotFound(PathBuf),

    /// The ONNX session could not be created
    #[error("Failed to load model {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// The category list is unreadable or malformed
    #[error("Invalid category list {path}: {message}")]
    Categories { path: PathBuf, message: String },

    /// The category list violates set invariants (empty, duplicates)
    #[error("Invalid category set: {0}")]
    InvalidCategories(String),

    /// Inference itself failed
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Classifier output length disagrees with the category set
    #[error("Classifier produced {actual} scores for {expected} categories")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Failure of a single image generation provider.
///
/// These are absorbed by the orchestrator, which moves on to the next
/// provider in the chain.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The provider did not answer within its time budget
    #[error("Timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The hosted model is still warming up
    #[error("{provider} model is loading. Try again in 30 seconds.")]
    ModelLoading { provider: String },

    /// Connection, DNS or TLS failure
    #[error("Request failed: {0}")]
    Network(String),

    /// The provider answered 2xx but the payload was unusable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Writing generated bytes to the image cache failed
    #[error("Failed to store generated image: {0}")]
    Cache(String),
}

/// Per-request errors, classified as client or server faults.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Malformed or missing request fields
    #[error("{0}")]
    InvalidInput(String),

    /// Image bytes could not be decoded
    #[error("Invalid image data: {0}")]
    DecodeFailure(String),

    /// Every provider in the generation chain failed
    #[error("{message}: {details}")]
    OrchestrationFailure {
        message: String,
        details: String,
        attempts: Vec<ProviderAttempt>,
    },

    /// Anything unexpected; details are for server logs only
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Whether the caller is at fault (4xx) rather than the server (5xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::DecodeFailure(_))
    }

    /// Message safe to return to API callers.
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidInput(msg) => msg.clone(),
            Self::DecodeFailure(_) => self.to_string(),
            Self::OrchestrationFailure { message, .. } => message.clone(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Extra detail returned alongside the public message, if any.
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::OrchestrationFailure { details, .. } => Some(details),
            _ => None,
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(err: ModelError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Convenience type alias for SketchLens results.
pub type Result<T> = std::result::Result<T, SketchError>;

/// Convenience type alias for per-request results.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(ServiceError::InvalidInput("No canvas data provided".into()).is_client_error());
        assert!(ServiceError::DecodeFailure("bad header".into()).is_client_error());
        assert!(!ServiceError::Internal("boom".into()).is_client_error());
    }

    #[test]
    fn test_internal_message_is_generic() {
        let err = ServiceError::Internal("session lock poisoned".into());
        assert_eq!(err.public_message(), "Internal server error");
        assert!(err.to_string().contains("poisoned"));
    }

    #[test]
    fn test_decode_failure_message() {
        let err = ServiceError::DecodeFailure("unsupported format".into());
        assert_eq!(err.public_message(), "Invalid image data: unsupported format");
    }

    #[test]
    fn test_orchestration_failure_details() {
        let err = ServiceError::OrchestrationFailure {
            message: "Image generation failed".into(),
            details: "HTTP 500: upstream".into(),
            attempts: vec![],
        };
        assert!(!err.is_client_error());
        assert_eq!(err.public_message(), "Image generation failed");
        assert_eq!(err.details(), Some("HTTP 500: upstream"));
    }

    #[test]
    fn test_model_error_becomes_internal() {
        let err: ServiceError = ModelError::DimensionMismatch {
            expected: 8,
            actual: 3,
        }
        .into();
        assert!(matches!(err, ServiceError::Internal(_)));
    }
}
