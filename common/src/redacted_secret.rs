//! Backend socket secret with redacted Debug output.

use crate::{ErrorLocation, RedactError};

use std::fmt;
use std::panic::Location;

use serde::ser::Error;
use zeroize::Zeroize;

const REDACTED: &str = "[REDACTED]";

/// Shared secret a kernel must present when it connects back to the backend.
///
/// The value is wiped from memory on drop and never shows up in `Debug`,
/// `Display` or serde output.
#[derive(Clone)]
pub struct RedactedSecret {
    inner: String,
}

impl RedactedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            inner: secret.into(),
        }
    }

    /// Placeholder text used wherever the secret would otherwise be printed.
    pub const fn redacted() -> &'static str {
        REDACTED
    }

    /// Raw secret value.
    ///
    /// # Security Note
    /// Only call this when the secret is actually handed to the kernel
    /// (bootstrap script) or compared against a presented token.
    #[inline]
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Compare against a presented token without short-circuiting on the
    /// first differing byte.
    pub fn matches(&self, presented: &str) -> bool {
        let expected = self.inner.as_bytes();
        let presented = presented.as_bytes();

        if expected.len() != presented.len() {
            return false;
        }

        expected
            .iter()
            .zip(presented)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for RedactedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RedactedSecret({REDACTED})")
    }
}

impl fmt::Display for RedactedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl PartialEq for RedactedSecret {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.inner)
    }
}

impl Eq for RedactedSecret {}

impl Drop for RedactedSecret {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl serde::Serialize for RedactedSecret {
    #[track_caller]
    fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        Err(S::Error::custom(RedactError::SerializationRefused {
            type_name: "RedactedSecret",
            message: String::from("RedactedSecret cannot be serialized - use expose() explicitly"),
            location: ErrorLocation::from(Location::caller()),
        }))
    }
}
