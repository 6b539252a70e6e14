pub mod backend;
pub mod bootstrap;
pub mod config;
pub mod execute;
pub mod frame;

use thiserror::Error;

/// Failure of a session's open sequence.
///
/// Every variant aborts session creation; nothing below this level retries.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Backend(#[from] backend::BackendError),

    #[error(transparent)]
    Bootstrap(#[from] bootstrap::BootstrapError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}
