//! IR kernel bootstrap handshake.
//!
//! Once the shared backend is running, each session sends its kernel one
//! rendered R script that loads SparkR and connects back to the backend.
//! The handshake is a single blocking execute: a non-success status fails
//! the session with the kernel's own output, and nothing is retried.

pub mod context;
pub mod lib_path;

use crate::bootstrap::context::BootstrapScriptContext;
use crate::config::{
    BACKEND_CONNECTION_TIMEOUT_DEFAULT, BACKEND_CONNECTION_TIMEOUT_KEY, InterpreterProperties,
};
use crate::error::bootstrap::BootstrapError;
use crate::error::config::ConfigError;
use crate::kernel_client::KernelClient;
use crate::template::{render, unresolved_placeholders};

use common::ErrorLocation;
use models::{BackendInfo, ExecuteRequest};

use std::borrow::Cow;
use std::panic::Location;
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::timeout as TokioTimeout;

/// Bundled bootstrap script.
pub const EMBEDDED_BOOTSTRAP_SCRIPT: &str = include_str!("../../resources/R/zeppelin_isparkr.R");
pub const EMBEDDED_BOOTSTRAP_SCRIPT_NAME: &str = "R/zeppelin_isparkr.R";

/// SparkR protocol version the bundled script targets (2.4.3).
pub const DEFAULT_SPARK_VERSION: u32 = 20403;

/// Extra time on top of the kernel's own connection timeout before the
/// handshake is abandoned.
const EXECUTE_DEADLINE_GRACE: Duration = Duration::from_secs(30);

const BOOTSTRAP_FAILURE_MESSAGE: &str = "Fail to setup JVM gateway";

/// What the kernel flavour supports.
///
/// Plain IR kernels only use SparkR for the backend channel; Spark-backed
/// variants flip `spark_supported` and report their own `spark_version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelCapabilities {
    pub spark_supported: bool,
    pub spark_version: u32,
    /// SparkR 2.4.3+ authenticates backend sockets with a secret.
    pub secret_supported: bool,
}

impl Default for KernelCapabilities {
    fn default() -> Self {
        Self {
            spark_supported: false,
            spark_version: DEFAULT_SPARK_VERSION,
            secret_supported: true,
        }
    }
}

/// Where the raw bootstrap template comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScriptSource {
    #[default]
    Embedded,
    File(PathBuf),
}

impl ScriptSource {
    pub fn load(&self) -> Result<Cow<'static, str>, BootstrapError> {
        match self {
            ScriptSource::Embedded => Ok(Cow::Borrowed(EMBEDDED_BOOTSTRAP_SCRIPT)),
            ScriptSource::File(path) => std::fs::read_to_string(path)
                .map(Cow::Owned)
                .map_err(|e| BootstrapError::Resource {
                    location: ErrorLocation::from(Location::caller()),
                    path: path.clone(),
                    source: e,
                }),
        }
    }

    fn describe(&self) -> Cow<'_, str> {
        match self {
            ScriptSource::Embedded => Cow::Borrowed(EMBEDDED_BOOTSTRAP_SCRIPT_NAME),
            ScriptSource::File(path) => path.to_string_lossy(),
        }
    }
}

/// Bootstrap script ready to send, plus a copy safe to log.
#[derive(Debug, Clone)]
pub struct RenderedScript {
    code: String,
    redacted: String,
    connection_timeout: Duration,
}

impl RenderedScript {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn redacted(&self) -> &str {
        &self.redacted
    }

    /// Connection timeout the kernel was told to use.
    pub fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }

    /// How long the host waits for the kernel's answer: the connection
    /// timeout plus a 30 s grace period.
    pub fn execute_deadline(&self) -> Duration {
        self.connection_timeout.saturating_add(EXECUTE_DEADLINE_GRACE)
    }

    pub fn into_request(self) -> ExecuteRequest {
        ExecuteRequest::new(self.code)
    }
}

pub struct KernelBootstrapper {
    capabilities: KernelCapabilities,
    script: ScriptSource,
    lib_path: PathBuf,
}

impl KernelBootstrapper {
    /// Bootstrapper using the bundled script and the SparkR lib path
    /// resolved from the environment.
    pub fn new(capabilities: KernelCapabilities) -> Self {
        Self {
            capabilities,
            script: ScriptSource::default(),
            lib_path: lib_path::resolve_sparkr_lib(capabilities.spark_supported),
        }
    }

    pub fn with_script_source(mut self, script: ScriptSource) -> Self {
        self.script = script;
        self
    }

    pub fn with_lib_path(mut self, lib_path: impl Into<PathBuf>) -> Self {
        self.lib_path = lib_path.into();
        self
    }

    pub fn capabilities(&self) -> &KernelCapabilities {
        &self.capabilities
    }

    /// Resolve the timeout, fill the placeholders and render the template.
    ///
    /// # Errors
    ///
    /// - [`BootstrapError::Config`] if the connection timeout is not a whole number of seconds
    /// - [`BootstrapError::Resource`] if a file template cannot be read
    pub fn render_script(
        &self,
        backend: &BackendInfo,
        properties: &InterpreterProperties,
    ) -> Result<RenderedScript, BootstrapError> {
        let timeout = properties.get(
            BACKEND_CONNECTION_TIMEOUT_KEY,
            BACKEND_CONNECTION_TIMEOUT_DEFAULT,
        );
        let connection_timeout = parse_timeout_secs(&timeout)?;

        let context =
            BootstrapScriptContext::new(backend, &self.capabilities, &self.lib_path, &timeout);

        let template = self.script.load()?;
        let code = render(&template, context.substitutions());
        let redacted = render(&template, &context.redacted());

        let unresolved = unresolved_placeholders(&code);
        if !unresolved.is_empty() {
            warn!(
                "Bootstrap script {} has unresolved placeholders: {}",
                self.script.describe(),
                unresolved.join(", ")
            );
        }

        Ok(RenderedScript {
            code,
            redacted,
            connection_timeout,
        })
    }

    /// Run the handshake against `client`.
    ///
    /// Blocks until the kernel answers or the deadline passes. The deadline is
    /// the resolved connection timeout plus a 30 s grace period; with the
    /// default `spark.r.backendConnectionTimeout` of 6000 s that is 6030 s,
    /// a little over 100 minutes. Lower the property to fail faster.
    ///
    /// # Errors
    ///
    /// - [`BootstrapError::Kernel`] if the kernel reports a non-success status
    /// - [`BootstrapError::Execute`] if the execute transport fails
    /// - [`BootstrapError::Timeout`] if the deadline passes
    /// - anything [`render_script`](Self::render_script) returns
    pub async fn bootstrap<C: KernelClient>(
        &self,
        backend: &BackendInfo,
        properties: &InterpreterProperties,
        client: &C,
    ) -> Result<(), BootstrapError> {
        let script = self.render_script(backend, properties)?;
        let deadline = script.execute_deadline();

        info!("Init IR kernel via script:\n{}", script.redacted());

        let response = TokioTimeout(deadline, client.block_execute(script.into_request()))
            .await
            .map_err(|_| BootstrapError::Timeout {
                message: format!("Kernel did not answer the bootstrap script within {deadline:?}"),
                location: ErrorLocation::from(Location::caller()),
            })?
            .map_err(|e| BootstrapError::Execute {
                message: format!("Failed to send bootstrap script to kernel: {e}"),
                location: ErrorLocation::from(Location::caller()),
                source: e,
            })?;

        if !response.is_success() {
            warn!("IR kernel bootstrap failed: {}", response.output);
            return Err(BootstrapError::Kernel {
                message: BOOTSTRAP_FAILURE_MESSAGE.to_string(),
                output: response.output,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        debug!("IR kernel bootstrap output: {}", response.output);
        info!("IR kernel connected to backend on port {}", backend.port);
        Ok(())
    }
}

#[track_caller]
fn parse_timeout_secs(raw: &str) -> Result<Duration, BootstrapError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| BootstrapError::Config {
            message: format!("Invalid {BACKEND_CONNECTION_TIMEOUT_KEY}"),
            location: ErrorLocation::from(Location::caller()),
            source: ConfigError::InvalidValue {
                location: ErrorLocation::from(Location::caller()),
                key: BACKEND_CONNECTION_TIMEOUT_KEY.to_string(),
                value: raw.to_string(),
                reason: e.to_string(),
            },
        })
}
