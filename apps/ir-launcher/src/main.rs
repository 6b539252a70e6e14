use ir_launcher::cli::Cli;
use ir_launcher::commands;
use ir_launcher::error::LauncherError;
use ir_launcher::logger::initialize as LoggerInitialize;

use kernel_core::config::InterpreterProperties;

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;
use std::process::ExitCode;

use clap::Parser;
use log::{LevelFilter, error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match launch(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn launch(cli: &Cli) -> Result<(), LauncherError> {
    // SPARK_HOME / ZEPPELIN_HOME may come from .env
    let dotenv_path = dotenvy::dotenv().ok();

    let config_dir = cli.config_dir()?;
    create_dir_all(&config_dir).map_err(|e| LauncherError::Environment {
        message: format!("Failed to create {}: {e}", config_dir.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    LoggerInitialize(&config_dir, cli.log_level.map(LevelFilter::from))?;

    info!("IR launcher starting");
    info!("Config directory: {}", config_dir.display());
    if let Some(path) = dotenv_path {
        info!("Loaded .env from: {}", path.display());
    }

    let properties = InterpreterProperties::load(&config_dir)?;
    commands::run(cli, properties).await
}
