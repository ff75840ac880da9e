//! Canvas normalization for the sketch classifier.
//!
//! The classifier was trained on ink-as-foreground bitmaps:
//! - Input size: 28×28 pixels (configurable)
//! - Single luminance channel
//! - Intensities inverted so dark strokes on a light canvas become high values
//! - Values scaled to [0, 1] via `pixel / 255`
//! - Tensor layout: NHWC [batch, height, width, channels]

use std::io::Cursor;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;

use crate::config::{LimitsConfig, NormalizerConfig};
use crate::error::{ServiceError, ServiceResult};

/// Marker separating a data-URI header from its payload.
const BASE64_MARKER: &str = "base64,";

/// Maximum channel value for 8-bit luminance.
const MAX_CHANNEL: f32 = 255.0;

/// Browsers are inconsistent about trailing `=` on canvas exports.
const CANVAS_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Normalized classifier input: shape `[1, size, size, 1]`, values in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct PixelTensor {
    data: Array4<f32>,
}

impl PixelTensor {
    /// Wrap an existing NHWC array.
    pub fn from_array(data: Array4<f32>) -> Self {
        Self { data }
    }

    /// An all-background tensor (no ink) of the given size.
    pub fn blank(size: u32) -> Self {
        let size = size as usize;
        Self {
            data: Array4::<f32>::zeros((1, size, size, 1)),
        }
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn as_array(&self) -> &Array4<f32> {
        &self.data
    }

    /// Row-major pixel values.
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().copied()
    }
}

/// Turns encoded canvas images into classifier-ready tensors.
#[derive(Debug, Clone)]
pub struct ImageNormalizer {
    input_size: u32,
    invert: bool,
    filter: FilterType,
    max_dimension: u32,
}

impl ImageNormalizer {
    pub fn new(config: &NormalizerConfig, limits: &LimitsConfig) -> Self {
        Self {
            input_size: config.input_size,
            invert: config.invert,
            filter: config.filter.into(),
            max_dimension: limits.max_image_dimension,
        }
    }

    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    /// Normalize canvas data sent as base64, optionally wrapped in a data URI.
    pub fn normalize_encoded(&self, canvas_data: &str) -> ServiceResult<PixelTensor> {
        let bytes = decode_canvas_data(canvas_data)?;
        self.normalize_bytes(&bytes)
    }

    /// Normalize raw encoded image bytes (PNG, JPEG, ...).
    ///
    /// Dimensions are checked from the header before any pixels are
    /// allocated.
    pub fn normalize_bytes(&self, bytes: &[u8]) -> ServiceResult<PixelTensor> {
        let mut reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ServiceError::DecodeFailure(format!("cannot detect image format: {e}")))?;
        if reader.format().is_none() {
            return Err(ServiceError::DecodeFailure(
                "unrecognized image format".to_string(),
            ));
        }

        let mut limits = image::Limits::default();
        limits.max_image_width = Some(self.max_dimension);
        limits.max_image_height = Some(self.max_dimension);
        reader.limits(limits);

        let image = reader.decode().map_err(|e| match e {
            image::ImageError::Limits(_) => ServiceError::DecodeFailure(format!(
                "image too large (limit {0}x{0})",
                self.max_dimension
            )),
            other => ServiceError::DecodeFailure(other.to_string()),
        })?;

        Ok(self.normalize_image(&image))
    }

    /// Grayscale, resize, invert and scale an already decoded image.
    pub fn normalize_image(&self, image: &DynamicImage) -> PixelTensor {
        let gray = image.to_luma8();
        let resized = image::imageops::resize(&gray, self.input_size, self.input_size, self.filter);

        let size = self.input_size as usize;
        let mut tensor = Array4::<f32>::zeros((1, size, size, 1));
        for (dst, &luma) in tensor.iter_mut().zip(resized.as_raw().iter()) {
            let ink = if self.invert { u8::MAX - luma } else { luma };
            *dst = ink as f32 / MAX_CHANNEL;
        }

        PixelTensor::from_array(tensor)
    }
}

/// Strip an optional data-URI header and decode the base64 payload.
pub fn decode_canvas_data(canvas_data: &str) -> ServiceResult<Vec<u8>> {
    let payload: String = strip_data_uri(canvas_data)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if payload.is_empty() {
        return Err(ServiceError::DecodeFailure("empty image payload".to_string()));
    }
    CANVAS_BASE64
        .decode(payload.as_bytes())
        .map_err(|e| ServiceError::DecodeFailure(format!("base64: {e}")))
}

/// Return everything after the first `base64,` marker, or the input unchanged.
pub fn strip_data_uri(canvas_data: &str) -> &str {
    match canvas_data.find(BASE64_MARKER) {
        Some(idx) => &canvas_data[idx + BASE64_MARKER.len()..],
        None => canvas_data,
    }
}
