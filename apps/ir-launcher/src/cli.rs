use crate::error::LauncherError;

use kernel_core::bootstrap::{
    DEFAULT_SPARK_VERSION, KernelBootstrapper, KernelCapabilities, ScriptSource,
};

use common::ErrorLocation;

use std::panic::Location;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

/// Directory under the platform config dir used when `--config-dir` is absent.
pub const APP_DIR_NAME: &str = "ir-launcher";

#[derive(Parser, Debug)]
#[command(name = "ir-launcher")]
#[command(about = "Start a shared SparkR backend and bootstrap IR kernels against it")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding interpreter.toml and the log file
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Bootstrap script template to use instead of the bundled one
    #[arg(long, global = true)]
    pub script: Option<PathBuf>,

    /// SparkR package directory (default: resolved from SPARK_HOME / ZEPPELIN_HOME)
    #[arg(long, global = true)]
    pub lib_path: Option<PathBuf>,

    /// Kernel runs against a Spark installation
    #[arg(long, global = true)]
    pub spark: bool,

    /// Spark version as an integer, e.g. 20403 for 2.4.3
    #[arg(long, global = true, default_value_t = DEFAULT_SPARK_VERSION)]
    pub spark_version: u32,

    /// Kernel does not support secret authentication
    #[arg(long, global = true)]
    pub no_secret: bool,

    /// Log level override
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the bootstrap script for a placeholder backend
    Render {
        /// Port written into the script
        #[arg(long, default_value_t = 7077)]
        port: u16,
    },

    /// Start the shared backend and wait for kernels until interrupted
    Serve,

    /// Start the backend and bootstrap the kernel behind a gateway
    Open {
        /// Kernel gateway address, e.g. 127.0.0.1:9001
        #[arg(long)]
        kernel: String,
    },
}

impl Cli {
    pub fn capabilities(&self) -> KernelCapabilities {
        KernelCapabilities {
            spark_supported: self.spark,
            spark_version: self.spark_version,
            secret_supported: !self.no_secret,
        }
    }

    pub fn bootstrapper(&self) -> KernelBootstrapper {
        let mut bootstrapper = KernelBootstrapper::new(self.capabilities());

        if let Some(script) = &self.script {
            bootstrapper = bootstrapper.with_script_source(ScriptSource::File(script.clone()));
        }
        if let Some(lib_path) = &self.lib_path {
            bootstrapper = bootstrapper.with_lib_path(lib_path.clone());
        }

        bootstrapper
    }

    /// `--config-dir`, else `<platform config dir>/ir-launcher`.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::Environment`] if the platform has no config dir.
    #[track_caller]
    pub fn config_dir(&self) -> Result<PathBuf, LauncherError> {
        if let Some(dir) = &self.config_dir {
            return Ok(dir.clone());
        }

        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| LauncherError::Environment {
                message: String::from("No platform config directory; pass --config-dir"),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
