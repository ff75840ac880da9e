//! The `sketchlens serve` command.

use clap::Args;
use sketchlens_core::Config;
use std::sync::Arc;

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (defaults to `server.host`)
    #[arg(long, env = "SKETCHLENS_HOST")]
    pub host: Option<String>,

    /// Port to listen on (defaults to `server.port`)
    #[arg(short, long, env = "SKETCHLENS_PORT")]
    pub port: Option<u16>,
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let lens = super::load_lens(config).await?;
    tracing::info!(
        "Model categories: {}",
        lens.categories().labels().join(", ")
    );
    tracing::info!("Test accuracy: {:.2}%", lens.accuracy() * 100.0);
    tracing::info!(
        "Image providers: [{}]",
        lens.orchestrator().provider_names().join(", ")
    );

    crate::server::serve(Arc::new(lens), &addr).await
}
