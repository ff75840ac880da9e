//! SketchLens CLI - sketch recognition API with stylized image generation.
//!
//! SketchLens classifies hand-drawn sketches with a trained model and can
//! turn the predicted label into a generated image through a chain of
//! text-to-image providers.
//!
//! # Usage
//!
//! ```bash
//! # Start the HTTP API
//! sketchlens serve --port 5000
//!
//! # Classify a local drawing
//! sketchlens predict drawing.png
//!
//! # Generate an image for a label
//! sketchlens generate cat --style cartoon
//!
//! # View configuration
//! sketchlens config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;
mod server;

/// SketchLens - sketch recognition API with stylized image generation.
#[derive(Parser, Debug)]
#[command(name = "sketchlens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(cli::serve::ServeArgs),

    /// Classify a sketch image file
    Predict(cli::predict::PredictArgs),

    /// Generate an image for a label through the provider chain
    Generate(cli::generate::GenerateArgs),

    /// List the categories the model can recognize
    Categories,

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match sketchlens_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `sketchlens config path`."
            );
            sketchlens_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("SketchLens v{}", sketchlens_core::VERSION);

    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Predict(args) => cli::predict::execute(args, config).await,
        Commands::Generate(args) => cli::generate::execute(args, config).await,
        Commands::Categories => cli::categories::execute(config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
