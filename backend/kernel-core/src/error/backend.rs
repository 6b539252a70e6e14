use common::ErrorLocation;

use std::error::Error as StdError;

use thiserror::Error as ThisError;

/// Shared backend could not be initialized or activated.
#[derive(Debug, ThisError)]
pub enum BackendError {
    #[error("Backend Init Error: {message} {location}")]
    Init {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Backend Start Error: {message} {location}")]
    Start {
        message: String,
        location: ErrorLocation,
    },

    #[error("Backend Already Started Error: {message} {location}")]
    AlreadyStarted {
        message: String,
        location: ErrorLocation,
    },

    #[error("Backend Not Initialized Error: {message} {location}")]
    NotInitialized {
        message: String,
        location: ErrorLocation,
    },
}
