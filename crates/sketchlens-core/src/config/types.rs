//! Sub-configuration structs and their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,

    /// URL prefix under which cached images are served
    pub static_url_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            static_url_prefix: "/static".to_string(),
        }
    }
}

/// Trained classifier artifact settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory holding the exported model and its metadata
    pub dir: PathBuf,

    /// ONNX model filename inside `dir`
    pub model_file: String,

    /// JSON array of category labels inside `dir`
    pub categories_file: String,

    /// Recorded test accuracy inside `dir` (optional file)
    pub accuracy_file: String,

    /// Feed `[N, 1, H, W]` instead of the Keras-style `[N, H, W, 1]`
    pub channels_first: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./model"),
            model_file: "sketch_model.onnx".to_string(),
            categories_file: "categories.json".to_string(),
            accuracy_file: "model_accuracy.txt".to_string(),
            channels_first: false,
        }
    }
}

/// Resampling filter used when shrinking a canvas to the model resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for image::imageops::FilterType {
    fn from(filter: ResizeFilter) -> Self {
        use image::imageops::FilterType;
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Canvas normalization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Square input resolution expected by the classifier
    pub input_size: u32,

    /// Invert intensities so dark ink on a light canvas becomes foreground
    pub invert: bool,

    /// Resampling filter (bicubic by default)
    pub filter: ResizeFilter,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            input_size: 28,
            invert: true,
            filter: ResizeFilter::CatmullRom,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in megabytes
    pub max_payload_mb: u64,

    /// Maximum decoded canvas dimension (width or height)
    pub max_image_dimension: u32,

    /// Upper bound for normalization + inference in milliseconds
    pub inference_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_payload_mb: 10,
            max_image_dimension: 4096,
            inference_timeout_ms: 10_000,
        }
    }
}

/// Image generation chain settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Providers to try, in order
    pub providers: Vec<String>,

    /// Directory where byte-returning providers store images
    pub cache_dir: PathBuf,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            providers: vec!["huggingface".to_string(), "pollinations".to_string()],
            cache_dir: PathBuf::from("./static"),
        }
    }
}

/// Per-provider settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub huggingface: HuggingFaceConfig,
    pub pollinations: PollinationsConfig,
    pub openai: OpenAiConfig,
}

/// Hugging Face inference API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HuggingFaceConfig {
    /// Full model inference URL
    pub endpoint: String,

    /// Bearer token (supports ${ENV_VAR} syntax); optional
    pub api_key: String,

    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            endpoint:
                "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-2-1"
                    .to_string(),
            api_key: "${HF_TOKEN}".to_string(),
            timeout_ms: 30_000,
        }
    }
}

/// Pollinations configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollinationsConfig {
    /// Base URL; prompts are appended under `/prompt/`
    pub endpoint: String,

    pub width: u32,

    pub height: u32,

    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for PollinationsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://image.pollinations.ai".to_string(),
            width: 512,
            height: 512,
            timeout_ms: 15_000,
        }
    }
}

/// OpenAI Images API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API base URL
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Image model name
    pub model: String,

    /// Requested image size, e.g. "512x512"
    pub size: String,

    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "dall-e-2".to_string(),
            size: "512x512".to_string(),
            timeout_ms: 60_000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
