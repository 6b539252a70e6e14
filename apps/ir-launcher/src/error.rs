use kernel_core::error::CoreError;
use kernel_core::error::backend::BackendError;
use kernel_core::error::bootstrap::BootstrapError;
use kernel_core::error::config::ConfigError;

use common::ErrorLocation;

use thiserror::Error;

/// Errors surfaced by the launcher binary.
///
/// Kernel-core failures pass through unchanged so their location points at the
/// place the failure happened rather than at the launcher.
#[derive(Debug, Error)]
pub enum LauncherError {
    /// Error from this App
    #[error("Launcher Error: {message} {location}")]
    Launcher {
        message: String,
        location: ErrorLocation,
    },

    /// Error from the environment (config dir, .env)
    #[error("Environment Error: {message} {location}")]
    Environment {
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<ConfigError> for LauncherError {
    fn from(error: ConfigError) -> Self {
        LauncherError::Core(CoreError::from(error))
    }
}

impl From<BackendError> for LauncherError {
    fn from(error: BackendError) -> Self {
        LauncherError::Core(CoreError::from(error))
    }
}

impl From<BootstrapError> for LauncherError {
    fn from(error: BootstrapError) -> Self {
        LauncherError::Core(CoreError::from(error))
    }
}
