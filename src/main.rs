//! Toolhouse - Main entry point.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use toolhouse::{
    Config, Toolbox,
    cli::{Cli, Command, run_call_command, serve},
    tools::ToolRegistry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load .env if present
    let _ = dotenvy::dotenv();

    init_tracing(cli.json_logs);

    let config = Config::from_env()?;
    tracing::debug!(?config, "Loaded configuration");

    let toolbox = Toolbox::new(&config);
    let registry = Arc::new(ToolRegistry::with_toolbox(&toolbox).await);

    match cli.resolved_command() {
        Command::Serve => {
            tracing::info!(tools = registry.list().await.len(), "Serving tool calls on stdin");
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            serve(Arc::clone(&registry), stdin, tokio::io::stdout()).await?;
            let snapshot = registry.metrics().snapshot();
            tracing::info!(
                requests = snapshot.requests_total,
                errors = snapshot.errors_total,
                "Shutting down"
            );
        }
        Command::List => {
            let schemas = registry.schemas().await;
            println!("{}", serde_json::to_string_pretty(&schemas)?);
        }
        Command::Call { tool, arguments } => {
            println!("{}", run_call_command(&registry, &tool, &arguments).await);
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout carries responses only.
fn init_tracing(json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("toolhouse=info"));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .init();
    }
}
