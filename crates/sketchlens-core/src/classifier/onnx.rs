//! ONNX Runtime session wrapper for the exported sketch classifier.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Value;

use super::normalize::PixelTensor;
use super::Classifier;
use crate::error::ModelError;

/// Sketch classifier backed by an ONNX Runtime session.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`, so concurrent
/// requests are serialized at inference time.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    channels_first: bool,
}

impl OnnxClassifier {
    /// Load an exported classifier from an ONNX file.
    ///
    /// `channels_first` selects an `[N, 1, H, W]` input shape instead of the
    /// default `[N, H, W, 1]`.
    pub fn load(model_path: &Path, channels_first: bool) -> Result<Self, ModelError> {
        if !model_path.exists() {
            return Err(ModelError::NotFound(model_path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(|e| ModelError::Load {
                path: model_path.to_path_buf(),
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(model_path)
            .map_err(|e| ModelError::Load {
                path: model_path.to_path_buf(),
                message: format!("Failed to load ONNX model: {e}"),
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "input".to_string());
        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .ok_or_else(|| ModelError::Load {
                path: model_path.to_path_buf(),
                message: "Model declares no outputs".to_string(),
            })?;

        tracing::debug!(
            "Loaded classifier from {:?} (input: {:?}, output: {:?})",
            model_path,
            input_name,
            output_name
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            channels_first,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&self, tensor: &PixelTensor) -> Result<Vec<f32>, ModelError> {
        let dims = tensor.shape();
        let shape: Vec<i64> = if self.channels_first {
            vec![dims[0] as i64, dims[3] as i64, dims[1] as i64, dims[2] as i64]
        } else {
            dims.iter().map(|&d| d as i64).collect()
        };
        // With a single channel NHWC and NCHW share the same flat layout.
        let flat_data: Vec<f32> = tensor.values().collect();

        let input_value = Value::from_array((shape, flat_data))
            .map_err(|e| ModelError::Inference(format!("Failed to create input tensor: {e}")))?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = self
            .session
            .lock()
            .map_err(|e| ModelError::Inference(format!("Session lock poisoned: {e}")))?;

        let outputs = session
            .run(inputs)
            .map_err(|e| ModelError::Inference(format!("ONNX inference failed: {e}")))?;

        let scores = outputs
            .iter()
            .find(|(name, _)| *name == self.output_name)
            .ok_or_else(|| {
                ModelError::Inference(format!("Model did not produce {}", self.output_name))
            })?;

        let (shape, data) = scores
            .1
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::Inference(format!("Failed to extract scores: {e}")))?;

        // Softmax output is [1, num_classes].
        match shape.len() {
            1 => Ok(data.to_vec()),
            2 => {
                let dim = shape[1] as usize;
                Ok(data[..dim].to_vec())
            }
            _ => Err(ModelError::Inference(format!(
                "Unexpected output shape: {:?}",
                shape
            ))),
        }
    }
}
