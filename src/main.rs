mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use portscout::api::{ApiServer, ErrorBody};
use portscout::{DockerInventory, PortscoutConfig, QueryError, QueryService};
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_path = PortscoutConfig::resolve_path(cli.config.as_deref())?;
    let mut config = match &config_path {
        Some(path) => PortscoutConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => PortscoutConfig::default(),
    };
    config.apply_overrides(cli.overrides());

    let _log_guard = config.logging.init_tracing()?;
    match &config_path {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }
    config.validate().context("Invalid configuration")?;

    info!(docker_host = %config.docker.host, "Portscout starting up");

    let inventory = DockerInventory::connect(&config.docker).await?;
    let service = Arc::new(QueryService::new(Arc::new(inventory)));

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            ApiServer::new(service)
                .with_address(config.listen_addr()?)
                .with_static_dir(config.server.static_dir.clone())
                .start()
                .await?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Containers => print_outcome(service.list_containers().await),

        Commands::Check { port } => print_outcome(service.check(Some(&port)).await),

        Commands::Suggest { start } => print_outcome(service.suggest(start.as_deref()).await),
    }
}

fn print_outcome<T: Serialize>(outcome: std::result::Result<T, QueryError>) -> Result<ExitCode> {
    match outcome {
        Ok(payload) => {
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{}", serde_json::to_string_pretty(&ErrorBody::from(&err))?);
            Ok(ExitCode::FAILURE)
        }
    }
}
