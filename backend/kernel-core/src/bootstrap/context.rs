//! Placeholder values for one bootstrap attempt.

use crate::bootstrap::KernelCapabilities;

use common::RedactedSecret;
use models::BackendInfo;

use std::collections::HashMap;
use std::path::Path;

pub const PORT_PLACEHOLDER: &str = "Port";
pub const VERSION_PLACEHOLDER: &str = "version";
pub const LIB_PATH_PLACEHOLDER: &str = "libPath";
pub const TIMEOUT_PLACEHOLDER: &str = "timeout";
pub const SPARK_SUPPORTED_PLACEHOLDER: &str = "isSparkSupported";
pub const AUTH_SECRET_PLACEHOLDER: &str = "authSecret";

/// Placeholder name to literal value, built fresh for each bootstrap.
///
/// String-typed values (library path, capability flag, secret) are stored
/// already quoted as R string literals; numbers are stored bare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapScriptContext {
    values: HashMap<String, String>,
    has_secret: bool,
}

impl BootstrapScriptContext {
    pub fn new(
        backend: &BackendInfo,
        capabilities: &KernelCapabilities,
        lib_path: &Path,
        timeout: &str,
    ) -> Self {
        let mut values = HashMap::with_capacity(6);
        values.insert(PORT_PLACEHOLDER.to_string(), backend.port.to_string());
        values.insert(
            VERSION_PLACEHOLDER.to_string(),
            capabilities.spark_version.to_string(),
        );
        values.insert(
            LIB_PATH_PLACEHOLDER.to_string(),
            r_string(&lib_path.to_string_lossy()),
        );
        values.insert(TIMEOUT_PLACEHOLDER.to_string(), timeout.to_string());
        values.insert(
            SPARK_SUPPORTED_PLACEHOLDER.to_string(),
            r_string(&capabilities.spark_supported.to_string()),
        );
        values.insert(
            AUTH_SECRET_PLACEHOLDER.to_string(),
            r_string(backend.secret_value()),
        );

        Self {
            values,
            has_secret: backend.secret.is_some(),
        }
    }

    pub fn substitutions(&self) -> &HashMap<String, String> {
        &self.values
    }

    /// Same values with the secret masked, for logging. An absent secret stays `""`.
    pub fn redacted(&self) -> HashMap<String, String> {
        let mut values = self.values.clone();
        if self.has_secret {
            values.insert(
                AUTH_SECRET_PLACEHOLDER.to_string(),
                r_string(RedactedSecret::redacted()),
            );
        }
        values
    }
}

/// Quote `value` as an R string literal.
pub(crate) fn r_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}
