use crate::ErrorLocation;

use thiserror::Error as ThisError;

/// Raised when something tries to push a [`RedactedSecret`](crate::RedactedSecret)
/// through a serializer.
#[derive(Debug, ThisError)]
pub enum RedactError {
    #[error("Serialization Refused: {type_name} {message} {location}")]
    SerializationRefused {
        type_name: &'static str,
        message: String,
        location: ErrorLocation,
    },
}
