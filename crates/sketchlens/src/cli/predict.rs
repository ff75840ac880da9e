//! The `sketchlens predict` command: classify a local image file.

use crate::server::PredictResponse;
use anyhow::Context;
use clap::Args;
use sketchlens_core::Config;
use std::path::PathBuf;

/// Arguments for the `predict` command.
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Image file containing a sketch (PNG, JPEG, ...)
    #[arg(required = true)]
    pub image: PathBuf,

    /// Free-text description echoed in the output
    #[arg(short, long, default_value = "")]
    pub description: String,
}

/// Execute the predict command, printing the same JSON the API returns.
pub async fn execute(args: PredictArgs, config: Config) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Failed to read {}", args.image.display()))?;

    let lens = super::load_lens(config).await?;
    let result = lens.predict_bytes(bytes).await?;

    let response = PredictResponse::new(result, args.description, lens.categories());
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
