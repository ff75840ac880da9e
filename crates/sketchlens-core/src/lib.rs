//! SketchLens Core - sketch recognition and image generation library.
//!
//! SketchLens classifies a hand-drawn sketch into one of a fixed set of
//! categories and can render the predicted label as an image through a
//! chain of external text-to-image providers.
//!
//! # Architecture
//!
//! ```text
//! canvas (base64) → Normalize → Classify (ONNX) → Format → PredictionResult
//! label + style   → Prompt → Provider chain → Cache → GenerationOutcome
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use sketchlens_core::{Config, SketchLens};
//!
//! #[tokio::main]
//! async fn main() -> sketchlens_core::Result<()> {
//!     let config = Config::load()?;
//!     let lens = SketchLens::load(config)?;
//!
//!     let prediction = lens.predict(canvas_data).await?;
//!     let outcome = lens.generate(&prediction.label, "cartoon").await?;
//!     println!("{} -> {}", prediction.label, outcome.image_reference);
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod generation;
pub mod types;

pub use classifier::{CategorySet, Classifier, ImageNormalizer, ModelArtifact, PixelTensor};
pub use config::Config;
pub use error::{
    ConfigError, ModelError, ProviderError, Result, ServiceError, ServiceResult, SketchError,
};
pub use generation::{GenerationOrchestrator, ImageCache, ImageProvider, ImageReference};
pub use types::{GenerationOutcome, PredictionResult, ProviderAttempt, Style};

use std::sync::Arc;
use std::time::Duration;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Process-wide service context, built once at startup and shared read-only.
pub struct SketchLens {
    config: Config,
    categories: Arc<CategorySet>,
    accuracy: f32,
    normalizer: ImageNormalizer,
    classifier: Arc<dyn Classifier>,
    orchestrator: GenerationOrchestrator,
}

impl SketchLens {
    /// Load the model artifact and build the provider chain from `config`.
    ///
    /// Fails if the artifact is missing, unloadable, or its output width
    /// disagrees with the category list.
    pub fn load(config: Config) -> Result<Self> {
        tracing::debug!("Initializing SketchLens v{}", VERSION);

        let artifact = ModelArtifact::load(&config)?;
        artifact.verify(config.normalizer.input_size)?;

        let orchestrator = GenerationOrchestrator::from_config(&config);

        Ok(Self::from_parts(config, artifact, orchestrator))
    }

    /// Assemble a context from already-built parts.
    pub fn from_parts(
        config: Config,
        artifact: ModelArtifact,
        orchestrator: GenerationOrchestrator,
    ) -> Self {
        let normalizer = ImageNormalizer::new(&config.normalizer, &config.limits);
        Self {
            config,
            categories: Arc::new(artifact.categories),
            accuracy: artifact.accuracy,
            normalizer,
            classifier: artifact.classifier,
            orchestrator,
        }
    }

    /// Classify base64 canvas data (optionally a `data:` URI).
    pub async fn predict(&self, canvas_data: &str) -> ServiceResult<PredictionResult> {
        if canvas_data.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "No canvas data provided".to_string(),
            ));
        }
        let canvas_data = canvas_data.to_string();
        let normalizer = self.normalizer.clone();
        self.run_blocking(move || normalizer.normalize_encoded(&canvas_data))
            .await
    }

    /// Classify raw encoded image bytes.
    pub async fn predict_bytes(&self, bytes: Vec<u8>) -> ServiceResult<PredictionResult> {
        let normalizer = self.normalizer.clone();
        self.run_blocking(move || normalizer.normalize_bytes(&bytes))
            .await
    }

    /// Normalize and classify on the blocking pool, bounded by the inference timeout.
    async fn run_blocking<F>(&self, normalize: F) -> ServiceResult<PredictionResult>
    where
        F: FnOnce() -> ServiceResult<PixelTensor> + Send + 'static,
    {
        let model = Arc::clone(&self.classifier);
        let categories = Arc::clone(&self.categories);
        let timeout_ms = self.config.limits.inference_timeout_ms;

        let task = tokio::task::spawn_blocking(move || -> ServiceResult<PredictionResult> {
            let tensor = normalize()?;
            let scores = model.classify(&tensor)?;
            Ok(classifier::format_prediction(&categories, &scores)?)
        });

        match tokio::time::timeout(Duration::from_millis(timeout_ms), task).await {
            Ok(Ok(result)) => {
                if let Ok(ref prediction) = result {
                    tracing::debug!(
                        "Predicted '{}' ({})",
                        prediction.label,
                        prediction.confidence_percent()
                    );
                }
                result
            }
            Ok(Err(e)) => Err(ServiceError::Internal(format!("inference task failed: {e}"))),
            Err(_) => Err(ServiceError::Internal(format!(
                "inference timed out after {timeout_ms}ms"
            ))),
        }
    }

    /// Generate an image for `label` in `style` through the provider chain.
    pub async fn generate(&self, label: &str, style: &str) -> ServiceResult<GenerationOutcome> {
        self.orchestrator.generate(label, style).await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    /// Recorded test accuracy of the loaded model, in [0, 1].
    pub fn accuracy(&self) -> f32 {
        self.accuracy
    }

    pub fn orchestrator(&self) -> &GenerationOrchestrator {
        &self.orchestrator
    }
}
