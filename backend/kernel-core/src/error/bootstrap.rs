use crate::error::config::ConfigError;
use crate::error::execute::ExecuteError;

use common::ErrorLocation;

use std::path::PathBuf;

use thiserror::Error as ThisError;

/// Kernel handshake did not complete.
#[derive(Debug, ThisError)]
pub enum BootstrapError {
    /// Kernel answered with a non-success status; `output` is its diagnostic text.
    #[error("Kernel Bootstrap Error: {message}\n{output} {location}")]
    Kernel {
        message: String,
        output: String,
        location: ErrorLocation,
    },

    #[error("Bootstrap Resource Error: {path:?}: {source} {location}")]
    Resource {
        location: ErrorLocation,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Bootstrap Execute Error: {message} {location}")]
    Execute {
        message: String,
        location: ErrorLocation,
        #[source]
        source: ExecuteError,
    },

    #[error("Bootstrap Timeout Error: {message} {location}")]
    Timeout {
        message: String,
        location: ErrorLocation,
    },

    #[error("Bootstrap Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
        #[source]
        source: ConfigError,
    },
}
