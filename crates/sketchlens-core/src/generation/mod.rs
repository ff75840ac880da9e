//! Text-to-image generation from a predicted label.
//!
//! A prompt is built from the label and style, then handed to an ordered
//! chain of providers until one produces an image. Hosted results are
//! passed through as URLs; raw bytes are written to the image cache.

pub mod cache;
pub mod huggingface;
pub mod openai;
pub mod orchestrator;
pub mod pollinations;
pub mod prompt;
pub mod provider;

#[cfg(test)]
pub(crate) mod test_server;

pub use cache::ImageCache;
pub use orchestrator::GenerationOrchestrator;
pub use prompt::build_prompt;
pub use provider::{ImageProvider, ImageReference, ProviderFactory, KNOWN_PROVIDERS};
