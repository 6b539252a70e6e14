use crate::error::frame::FrameError;

use common::ErrorLocation;

use std::error::Error as StdError;
use std::panic::Location;

use thiserror::Error as ThisError;

/// Transport failure while talking to a kernel gateway.
#[derive(Debug, ThisError)]
pub enum ExecuteError {
    #[error("Connect Error: {message} {location}")]
    Connect {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Transport Error: {message} {location}")]
    Transport {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Closed Error: {message} {location}")]
    Closed {
        message: String,
        location: ErrorLocation,
    },
}

impl From<FrameError> for ExecuteError {
    #[track_caller]
    fn from(error: FrameError) -> Self {
        if error.is_eof() {
            return ExecuteError::Closed {
                message: String::from("Kernel gateway closed the connection"),
                location: ErrorLocation::from(Location::caller()),
            };
        }

        ExecuteError::Transport {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(error),
        }
    }
}
