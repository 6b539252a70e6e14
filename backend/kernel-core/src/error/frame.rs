use common::ErrorLocation;

use std::io::Error as IoError;
use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum FrameError {
    #[error("Frame IO Error: {message} {location}")]
    Io {
        message: String,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },

    #[error("Frame Too Large Error: {message} {location}")]
    TooLarge {
        message: String,
        location: ErrorLocation,
    },

    #[error("Malformed Frame Error: {message} {location}")]
    Malformed {
        message: String,
        location: ErrorLocation,
    },

    #[error("Protobuf Decode Error: {message} {location}")]
    ProtobufDecode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Protobuf Encode Error: {message} {location}")]
    ProtobufEncode {
        message: String,
        location: ErrorLocation,
    },
}

impl FrameError {
    /// Peer closed the stream cleanly between frames.
    pub fn is_eof(&self) -> bool {
        matches!(self, FrameError::Io { source, .. } if source.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}

impl From<IoError> for FrameError {
    #[track_caller]
    fn from(error: IoError) -> Self {
        FrameError::Io {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source: error,
        }
    }
}

impl From<prost::DecodeError> for FrameError {
    #[track_caller]
    fn from(error: prost::DecodeError) -> Self {
        FrameError::ProtobufDecode {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<prost::EncodeError> for FrameError {
    #[track_caller]
    fn from(error: prost::EncodeError) -> Self {
        FrameError::ProtobufEncode {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
