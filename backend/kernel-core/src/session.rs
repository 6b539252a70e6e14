//! IR kernel session open sequence.
//!
//! A session shares its [`SparkRBackend`] with every other session in the
//! process and owns its own kernel client. Opening:
//!
//! 1. Starts the shared backend if no other session has
//! 2. Sends the bootstrap script so the kernel connects back to it

use crate::KERNEL_NAME;
use crate::backend::SparkRBackend;
use crate::bootstrap::{KernelBootstrapper, KernelCapabilities};
use crate::config::{InterpreterProperties, MAX_RESULT_DEFAULT, MAX_RESULT_KEY};
use crate::error::CoreError;
use crate::error::config::ConfigError;
use crate::kernel_client::KernelClient;

use models::BackendInfo;

use std::sync::Arc;

use log::{debug, info};

pub struct IrKernelSession<C> {
    backend: Arc<SparkRBackend>,
    properties: InterpreterProperties,
    bootstrapper: KernelBootstrapper,
    client: C,
}

impl<C: KernelClient> IrKernelSession<C> {
    pub fn new(
        backend: Arc<SparkRBackend>,
        properties: InterpreterProperties,
        capabilities: KernelCapabilities,
        client: C,
    ) -> Self {
        Self {
            backend,
            properties,
            bootstrapper: KernelBootstrapper::new(capabilities),
            client,
        }
    }

    /// Replace the default bootstrapper (script source, lib path).
    pub fn with_bootstrapper(mut self, bootstrapper: KernelBootstrapper) -> Self {
        self.bootstrapper = bootstrapper;
        self
    }

    /// Start the shared backend if needed, then bootstrap this session's kernel.
    ///
    /// Safe to call again on an opened session: the backend is reused and the
    /// handshake is re-sent.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Backend`] if this call had to start the backend and failed
    /// - [`CoreError::Bootstrap`] if the handshake failed
    pub async fn open(&self) -> Result<BackendInfo, CoreError> {
        let secret_supported = self.bootstrapper.capabilities().secret_supported;

        debug!("Opening {KERNEL_NAME} session");
        let backend = self.backend.ensure_started(secret_supported).await?;

        self.bootstrapper
            .bootstrap(&backend, &self.properties, &self.client)
            .await?;

        info!("{KERNEL_NAME} session open (backend port {})", backend.port);
        Ok(backend)
    }

    pub fn kernel_name(&self) -> &'static str {
        KERNEL_NAME
    }

    /// Row limit for the result rendering context.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the property is not a number.
    pub fn max_result(&self) -> Result<usize, ConfigError> {
        self.properties.get_parsed(MAX_RESULT_KEY, MAX_RESULT_DEFAULT)
    }

    pub fn backend(&self) -> &Arc<SparkRBackend> {
        &self.backend
    }

    pub fn properties(&self) -> &InterpreterProperties {
        &self.properties
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}
