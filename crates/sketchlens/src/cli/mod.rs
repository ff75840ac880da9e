//! Command implementations for the `sketchlens` binary.

pub mod categories;
pub mod config;
pub mod generate;
pub mod predict;
pub mod serve;

use sketchlens_core::{Config, SketchLens};

/// Load the model artifact and provider chain, off the async runtime.
pub(crate) async fn load_lens(config: Config) -> anyhow::Result<SketchLens> {
    let lens = tokio::task::spawn_blocking(move || SketchLens::load(config)).await??;
    Ok(lens)
}
