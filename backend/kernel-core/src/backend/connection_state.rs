//! Per-connection authentication state.
//!
//! Tracks whether a kernel connecting back to the backend has presented the
//! secret that was rendered into its bootstrap script.

use common::RedactedSecret;

pub(crate) struct ConnectionState {
    authenticated: bool,
    expected_secret: Option<RedactedSecret>,
}

impl ConnectionState {
    /// `None` means secrets are disabled and any presented value is accepted.
    pub(crate) fn new(expected_secret: Option<RedactedSecret>) -> Self {
        Self {
            authenticated: false,
            expected_secret,
        }
    }

    /// Validate the presented secret and mark the connection authenticated on a match.
    pub(crate) fn validate_secret(&mut self, presented: &str) -> bool {
        let accepted = match self.expected_secret {
            Some(ref expected) => expected.matches(presented),
            None => true,
        };

        self.authenticated = accepted;
        accepted
    }

    /// Whether the peer has to present a secret before it is accepted.
    pub(crate) fn requires_secret(&self) -> bool {
        self.expected_secret.is_some()
    }

    pub(crate) fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}
