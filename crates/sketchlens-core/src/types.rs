//! Core data types shared by the classification and generation paths.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The ranked outcome of classifying one sketch.
///
/// `distribution` preserves category order, so iterating it walks the
/// category set from index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Label at the arg-max index
    pub label: String,

    /// Probability of `label`, in [0, 1]
    pub confidence: f32,

    /// Every label with its raw probability
    pub distribution: IndexMap<String, f32>,
}

impl PredictionResult {
    /// Confidence rendered as `NN.N%`.
    pub fn confidence_percent(&self) -> String {
        format_percent(self.confidence)
    }

    /// Distribution with every probability rendered as `NN.N%`.
    pub fn distribution_percent(&self) -> IndexMap<String, String> {
        self.distribution
            .iter()
            .map(|(label, p)| (label.clone(), format_percent(*p)))
            .collect()
    }
}

/// Render a probability as a percentage with one decimal place.
pub fn format_percent(value: f32) -> String {
    format!("{:.1}%", value * 100.0)
}

/// Rendering style for generated images.
///
/// The set is closed; anything unrecognized resolves to [`Style::Realistic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Realistic,
    Artistic,
    Cartoon,
    Sketch,
}

impl Style {
    /// All recognized styles, in documentation order.
    pub const ALL: [Style; 4] = [
        Style::Realistic,
        Style::Artistic,
        Style::Cartoon,
        Style::Sketch,
    ];

    /// Resolve a style identifier, falling back to `Realistic`.
    pub fn resolve(id: &str) -> Self {
        match id.trim().to_ascii_lowercase().as_str() {
            "realistic" => Style::Realistic,
            "artistic" => Style::Artistic,
            "cartoon" => Style::Cartoon,
            "sketch" => Style::Sketch,
            other => {
                tracing::debug!("Unknown style '{other}', using realistic");
                Style::Realistic
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Realistic => "realistic",
            Style::Artistic => "artistic",
            Style::Cartoon => "cartoon",
            Style::Sketch => "sketch",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful result of the generation chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    /// Hosted URL or a path into the image cache
    pub image_reference: String,

    /// Name of the provider that produced the image
    pub provider_used: String,

    /// Prompt sent to the provider
    pub prompt: String,
}

/// One failed provider in a generation chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderAttempt {
    pub provider: String,
    pub error: String,
}
