//! The `sketchlens generate` command: run the provider chain once.

use clap::Args;
use sketchlens_core::generation::GenerationOrchestrator;
use sketchlens_core::{Config, ServiceError};

/// Arguments for the `generate` command.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Label to render (e.g. "cat")
    #[arg(required = true)]
    pub label: String,

    /// Rendering style: realistic, artistic, cartoon or sketch
    #[arg(short, long, default_value = "realistic")]
    pub style: String,
}

/// Execute the generate command.
///
/// Only the provider chain is built; the classifier is not loaded.
pub async fn execute(args: GenerateArgs, config: Config) -> anyhow::Result<()> {
    let orchestrator = GenerationOrchestrator::from_config(&config);

    match orchestrator.generate(&args.label, &args.style).await {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Err(ServiceError::OrchestrationFailure { attempts, .. }) => {
            for attempt in &attempts {
                eprintln!("  {}: {}", attempt.provider, attempt.error);
            }
            anyhow::bail!("Image generation failed after {} attempt(s)", attempts.len())
        }
        Err(e) => Err(e.into()),
    }
}
