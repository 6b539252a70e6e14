pub mod open;
pub mod render;
pub mod serve;

use crate::cli::{Cli, Commands};
use crate::error::LauncherError;

use kernel_core::backend::SparkRBackend;
use kernel_core::config::InterpreterProperties;

use common::ErrorLocation;

use std::panic::Location;
use std::sync::Arc;

use log::info;

/// Run the parsed command. `serve` and `open` return once interrupted.
pub async fn run(cli: &Cli, properties: InterpreterProperties) -> Result<(), LauncherError> {
    match &cli.command {
        Commands::Render { port } => {
            println!("{}", render::render(cli, &properties, *port)?);
            Ok(())
        }
        Commands::Serve => {
            let backend = SparkRBackend::get();
            let info = serve::serve(&backend, cli.capabilities().secret_supported).await?;
            println!("{}", serve::describe(&info));
            wait_for_shutdown(&backend).await
        }
        Commands::Open { kernel } => {
            let backend = SparkRBackend::get();
            let info = open::open(cli, Arc::clone(&backend), properties, kernel).await?;
            println!("{}", serve::describe(&info));
            wait_for_shutdown(&backend).await
        }
    }
}

async fn wait_for_shutdown(backend: &SparkRBackend) -> Result<(), LauncherError> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| LauncherError::Launcher {
            message: format!("Failed to listen for shutdown signal: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!(
        "Shutting down with {} connected kernel(s)",
        backend.connected_kernels()
    );
    Ok(())
}
