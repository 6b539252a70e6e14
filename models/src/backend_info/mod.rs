pub mod builder;

use common::RedactedSecret;

/// Connection parameters of a backend.
///
/// The backend publishes one only after `init` + `start` have both succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInfo {
    pub port: u16,
    pub secret: Option<RedactedSecret>,
}

impl BackendInfo {
    /// Secret value as it goes into the bootstrap script, empty when secrets are disabled.
    pub fn secret_value(&self) -> &str {
        self.secret
            .as_ref()
            .map(RedactedSecret::expose)
            .unwrap_or_default()
    }
}
