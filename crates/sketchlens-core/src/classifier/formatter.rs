//! Turns raw classifier scores into a ranked prediction.
//!
//! Raw model output is reported as-is: no smoothing, no thresholding.

use indexmap::IndexMap;

use super::CategorySet;
use crate::error::ModelError;
use crate::types::PredictionResult;

/// Index of the highest score, or `None` for an empty or all-NaN vector.
///
/// Ties resolve to the lowest index: later entries must be strictly greater
/// to take over.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Build a [`PredictionResult`] from a probability vector.
///
/// The vector must be index-aligned with `categories`.
pub fn format_prediction(
    categories: &CategorySet,
    scores: &[f32],
) -> Result<PredictionResult, ModelError> {
    if scores.len() != categories.len() {
        return Err(ModelError::DimensionMismatch {
            expected: categories.len(),
            actual: scores.len(),
        });
    }

    let top = argmax(scores)
        .ok_or_else(|| ModelError::Inference("Classifier returned no usable scores".to_string()))?;

    let distribution: IndexMap<String, f32> = categories
        .iter()
        .zip(scores.iter())
        .map(|(label, &p)| (label.to_string(), p))
        .collect();

    Ok(PredictionResult {
        label: categories.labels()[top].clone(),
        confidence: scores[top],
        distribution,
    })
}
