//! Sketch classification.
//!
//! The trained classifier is treated as an opaque scoring function: a
//! normalized `28×28×1` pixel tensor goes in, a probability vector over the
//! category set comes out.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sketchlens_core::classifier::{ImageNormalizer, ModelArtifact};
//! use sketchlens_core::Config;
//!
//! let config = Config::default();
//! let artifact = ModelArtifact::load(&config)?;
//! let normalizer = ImageNormalizer::new(&config.normalizer, &config.limits);
//! let tensor = normalizer.normalize_encoded(canvas_data)?;
//! let scores = artifact.classifier.classify(&tensor)?;
//! let result = format_prediction(&artifact.categories, &scores)?;
//! ```

pub(crate) mod formatter;
pub(crate) mod normalize;
pub(crate) mod onnx;

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::error::ModelError;

pub use self::formatter::{argmax, format_prediction};
pub use self::normalize::{decode_canvas_data, strip_data_uri, ImageNormalizer, PixelTensor};
pub use self::onnx::OnnxClassifier;

/// Stateless scoring function over normalized sketches.
///
/// Implementations must be safe to call from several blocking tasks at once.
pub trait Classifier: Send + Sync {
    /// Return one probability per category, index-aligned with the category set.
    fn classify(&self, tensor: &PixelTensor) -> Result<Vec<f32>, ModelError>;
}

/// Ordered, duplicate-free list of labels the classifier can predict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategorySet {
    labels: Vec<String>,
}

impl CategorySet {
    pub fn new(labels: Vec<String>) -> Result<Self, ModelError> {
        if labels.is_empty() {
            return Err(ModelError::InvalidCategories(
                "category list is empty".to_string(),
            ));
        }
        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(ModelError::InvalidCategories(format!(
                    "duplicate label '{label}'"
                )));
            }
        }
        Ok(Self { labels })
    }

    /// Load a JSON array of labels (the training artifact's `categories.json`).
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|e| ModelError::Categories {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let labels: Vec<String> =
            serde_json::from_str(&content).map_err(|e| ModelError::Categories {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Self::new(labels)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Read the recorded test accuracy, defaulting to 0.0 when absent or unparsable.
pub fn read_accuracy(path: &Path) -> f32 {
    match std::fs::read_to_string(path) {
        Ok(content) => match content.trim().parse::<f32>() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Ignoring unparsable accuracy file {:?}: {e}", path);
                0.0
            }
        },
        Err(_) => {
            tracing::debug!("No accuracy file at {:?}", path);
            0.0
        }
    }
}

/// Everything loaded from the trained model directory.
pub struct ModelArtifact {
    pub classifier: Arc<dyn Classifier>,
    pub categories: CategorySet,
    pub accuracy: f32,
}

impl ModelArtifact {
    /// Load the ONNX classifier, its categories and accuracy from `config.model`.
    pub fn load(config: &Config) -> Result<Self, ModelError> {
        let dir = config.model_dir();
        let model_path = dir.join(&config.model.model_file);

        tracing::info!("Loading classifier from {:?}", model_path);
        let classifier = OnnxClassifier::load(&model_path, config.model.channels_first)?;
        let categories = CategorySet::load(&dir.join(&config.model.categories_file))?;
        let accuracy = read_accuracy(&dir.join(&config.model.accuracy_file));
        tracing::info!(
            "Classifier loaded ({} categories, recorded accuracy {:.2}%)",
            categories.len(),
            accuracy * 100.0
        );

        Ok(Self {
            classifier: Arc::new(classifier),
            categories,
            accuracy,
        })
    }

    /// Run a blank canvas through the classifier and check the output width.
    pub fn verify(&self, input_size: u32) -> Result<(), ModelError> {
        let scores = self.classifier.classify(&PixelTensor::blank(input_size))?;
        if scores.len() != self.categories.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.categories.len(),
                actual: scores.len(),
            });
        }
        Ok(())
    }
}
