use crate::{BackendInfo, ErrorLocation, ModelError};

use common::RedactedSecret;

use std::panic::Location;

/// Builder for validated [`BackendInfo`] instances.
#[derive(Debug, Default)]
pub struct BackendInfoBuilder {
    port: Option<u16>,
    secret: Option<RedactedSecret>,
}

impl BackendInfoBuilder {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_secret(mut self, secret: Option<RedactedSecret>) -> Self {
        self.secret = secret;
        self
    }

    /// Build the BackendInfo with validation.
    #[track_caller]
    pub fn build(self) -> Result<BackendInfo, ModelError> {
        let port = self.port.ok_or_else(|| ModelError::Validation {
            message: String::from("Port is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if port == 0 {
            return Err(ModelError::Validation {
                message: String::from("Port must be non-zero"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if let Some(ref secret) = self.secret
            && secret.is_empty()
        {
            return Err(ModelError::Validation {
                message: String::from("Secret cannot be empty when provided"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(BackendInfo {
            port,
            secret: self.secret,
        })
    }
}
