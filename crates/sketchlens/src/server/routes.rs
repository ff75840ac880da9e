//! Route handlers for the sketch recognition API.

use super::error::ApiError;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Json,
};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Map, Value};
use sketchlens_core::{CategorySet, GenerationOutcome, PredictionResult, SketchLens};
use std::sync::Arc;

pub type AppState = Arc<SketchLens>;

/// Body of a successful `POST /api/predict`.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    pub prediction: String,
    pub confidence: String,
    pub confidence_value: f32,
    pub all_predictions: IndexMap<String, String>,
    pub all_predictions_values: IndexMap<String, f32>,
    pub description: String,
    pub timestamp: String,
    pub categories: Vec<String>,
}

impl PredictResponse {
    pub fn new(result: PredictionResult, description: String, categories: &CategorySet) -> Self {
        Self {
            success: true,
            confidence: result.confidence_percent(),
            all_predictions: result.distribution_percent(),
            prediction: result.label,
            confidence_value: result.confidence,
            all_predictions_values: result.distribution,
            description,
            timestamp: timestamp(),
            categories: categories.labels().to_vec(),
        }
    }
}

/// Body of a successful `POST /api/generate-image`.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub image_url: String,
    pub prompt: String,
    pub prediction: String,
    pub style: String,
    pub method: String,
}

impl GenerateResponse {
    fn new(outcome: GenerationOutcome, prediction: String, style: String) -> Self {
        Self {
            success: true,
            image_url: outcome.image_reference,
            prompt: outcome.prompt,
            prediction,
            style,
            method: outcome.provider_used,
        }
    }
}

/// Local time in ISO-8601 with microseconds.
fn timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// Parse a non-empty JSON object body; anything else counts as no data.
fn json_object(body: &Bytes) -> Option<Map<String, Value>> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if !map.is_empty() => Some(map),
        _ => None,
    }
}

fn string_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Sketch Recognition API",
        "endpoints": {
            "/api/health": "GET - Health check",
            "/api/predict": "POST - Submit drawing for prediction",
            "/api/categories": "GET - Get available categories",
            "/api/generate-image": "POST - Generate an image for a prediction",
        },
        "status": "online",
    }))
}

pub async fn health(State(lens): State<AppState>) -> Json<Value> {
    let categories = lens.categories();
    Json(json!({
        "status": "Server is running",
        "model": "Sketch Recognition Model",
        "categories": categories,
        "num_categories": categories.len(),
        "test_accuracy": format!("{:.2}%", lens.accuracy() * 100.0),
        "timestamp": timestamp(),
    }))
}

pub async fn categories(State(lens): State<AppState>) -> Json<Value> {
    let categories = lens.categories();
    Json(json!({
        "categories": categories,
        "count": categories.len(),
    }))
}

pub async fn predict(
    State(lens): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let body = body?;
    let data = json_object(&body).ok_or_else(|| ApiError::bad_request("No data provided"))?;
    let canvas_data = string_field(&data, "canvas_data")
        .ok_or_else(|| ApiError::bad_request("No canvas data provided"))?;
    let description = data
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let result = lens.predict(canvas_data).await?;
    tracing::info!(
        "Prediction: {} | Confidence: {} | Description: {}",
        result.label,
        result.confidence_percent(),
        description
    );

    Ok(Json(PredictResponse::new(
        result,
        description,
        lens.categories(),
    )))
}

pub async fn generate_image(
    State(lens): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let data = json_object(&body?).unwrap_or_default();
    // Echo the label exactly as it appears in the prompt.
    let prediction = string_field(&data, "prediction")
        .ok_or_else(|| ApiError::bad_request("No prediction provided"))?
        .trim()
        .to_string();
    let style = data
        .get("style")
        .and_then(Value::as_str)
        .unwrap_or("realistic")
        .to_string();

    let outcome = lens.generate(&prediction, &style).await?;
    Ok(Json(GenerateResponse::new(outcome, prediction, style)))
}

/// Fallback for missing files under the static prefix.
pub async fn image_not_found() -> ApiError {
    ApiError::not_found("Image not found")
}

pub async fn route_not_found() -> ApiError {
    ApiError::not_found("Not found")
}
