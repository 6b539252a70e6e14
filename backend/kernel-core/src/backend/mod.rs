//! Shared SparkR backend lifecycle.
//!
//! One backend serves every IR kernel session in the process. Kernels
//! connect back to it on a loopback port, authenticating with a secret the
//! backend generates once.
//!
//! # Lifecycle
//!
//! The backend is created unstarted. The first session to open runs
//! `init` (bind a port, generate the secret) and `start` (spawn the accept
//! loop) while holding the backend's lifecycle lock; every later session
//! takes the same lock, sees it started and just reads the connection info.
//!
//! ```no_run
//! use kernel_core::backend::SparkRBackend;
//! use std::sync::Arc;
//!
//! # async fn open() -> Result<(), kernel_core::error::backend::BackendError> {
//! let backend = Arc::new(SparkRBackend::new());
//! let mut guard = backend.lock().await;
//! if !guard.is_started() {
//!     guard.init(true).await?;
//!     guard.start()?;
//! }
//! let port = guard.port();
//! # Ok(())
//! # }
//! ```
//!
//! [`SparkRBackend::ensure_started`] wraps exactly that sequence.

pub mod auth;
pub(crate) mod connection_state;
mod server;

use crate::{BACKEND_BIND_ADDRESS, BACKEND_HOSTNAME};
use crate::error::backend::BackendError;

use common::{ErrorLocation, RedactedSecret};
use models::{BackendInfo, BackendInfoBuilder};

use std::panic::Location;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use log::{debug, info};
use once_cell::sync::Lazy;
use tokio::net::TcpListener;
use tokio::runtime::Handle as RuntimeHandle;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// How long a connecting kernel has to present the secret.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

static PROCESS_BACKEND: Lazy<Arc<SparkRBackend>> = Lazy::new(|| Arc::new(SparkRBackend::new()));

/// Listener bound by `init`, waiting for `start`.
struct PendingBackend {
    listener: TcpListener,
    info: BackendInfo,
}

/// Mutable lifecycle state, only reachable through [`BackendGuard`].
struct BackendState {
    pending: Option<PendingBackend>,
    init_calls: usize,
    bind_address: String,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            pending: None,
            init_calls: 0,
            bind_address: BACKEND_BIND_ADDRESS.to_string(),
        }
    }
}

/// Shared communication backend for IR kernels.
pub struct SparkRBackend {
    lifecycle: Mutex<BackendState>,
    running: OnceLock<BackendInfo>,
    connections: Arc<AtomicUsize>,
    handshake_timeout: Duration,
}

impl SparkRBackend {
    pub fn new() -> Self {
        Self {
            lifecycle: Mutex::new(BackendState::default()),
            running: OnceLock::new(),
            connections: Arc::new(AtomicUsize::new(0)),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Override how long connecting kernels get to authenticate.
    pub fn with_handshake_timeout(mut self, handshake_timeout: Duration) -> Self {
        self.handshake_timeout = handshake_timeout;
        self
    }

    /// Process-wide backend, created on first call.
    ///
    /// Sessions normally receive their backend by injection; this is the
    /// instance to inject when the host has no reason to run more than one.
    pub fn get() -> Arc<SparkRBackend> {
        Arc::clone(&PROCESS_BACKEND)
    }

    /// Take the lifecycle lock.
    ///
    /// `init` and `start` are only callable through the returned guard, so
    /// the started check and the initialization happen under one lock.
    pub async fn lock(&self) -> BackendGuard<'_> {
        BackendGuard {
            backend: self,
            state: self.lifecycle.lock().await,
        }
    }

    /// Start the backend unless some caller already has, and return its connection info.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if this caller ran `init`/`start` and either failed.
    /// The backend stays unstarted in that case and the next caller retries.
    pub async fn ensure_started(&self, secret_enabled: bool) -> Result<BackendInfo, BackendError> {
        let mut guard = self.lock().await;

        if !guard.is_started() {
            guard.init(secret_enabled).await?;
            guard.start()?;
        } else {
            debug!("SparkR backend already started, reusing it");
        }

        guard.info()
    }

    pub fn is_started(&self) -> bool {
        self.running.get().is_some()
    }

    /// `None` until started.
    pub fn port(&self) -> Option<u16> {
        self.running.get().map(|info| info.port)
    }

    /// `None` until started, and when started with secrets disabled.
    pub fn socket_secret(&self) -> Option<&RedactedSecret> {
        self.running.get().and_then(|info| info.secret.as_ref())
    }

    pub fn info(&self) -> Option<BackendInfo> {
        self.running.get().cloned()
    }

    /// Number of authenticated kernels currently connected.
    pub fn connected_kernels(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl Default for SparkRBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive access to a backend's lifecycle.
pub struct BackendGuard<'a> {
    backend: &'a SparkRBackend,
    state: MutexGuard<'a, BackendState>,
}

impl BackendGuard<'_> {
    pub fn is_started(&self) -> bool {
        self.backend.is_started()
    }

    /// Bind the backend port and, when `secret_enabled`, generate the secret.
    ///
    /// # Errors
    ///
    /// - [`BackendError::AlreadyStarted`] if the backend is running
    /// - [`BackendError::Init`] if the port cannot be bound
    pub async fn init(&mut self, secret_enabled: bool) -> Result<(), BackendError> {
        if self.is_started() {
            return Err(BackendError::AlreadyStarted {
                message: String::from("init called on a started backend"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.state.init_calls += 1;

        let bind_address = self.state.bind_address.as_str();
        let listener = TcpListener::bind(bind_address)
            .await
            .map_err(|e| BackendError::Init {
                message: format!("Failed to bind backend on {bind_address}: {e}"),
                location: ErrorLocation::from(Location::caller()),
                source: Box::new(e),
            })?;

        let port = listener
            .local_addr()
            .map_err(|e| BackendError::Init {
                message: format!("Failed to read bound backend address: {e}"),
                location: ErrorLocation::from(Location::caller()),
                source: Box::new(e),
            })?
            .port();

        let secret =
            secret_enabled.then(|| RedactedSecret::new(Uuid::new_v4().simple().to_string()));

        let info = BackendInfoBuilder::default()
            .with_port(port)
            .with_secret(secret)
            .build()
            .map_err(|e| BackendError::Init {
                message: format!("Invalid backend connection info: {e}"),
                location: ErrorLocation::from(Location::caller()),
                source: Box::new(e),
            })?;

        debug!(
            "SparkR backend bound to port {port} (secret_enabled={secret_enabled}, init #{})",
            self.state.init_calls
        );
        self.state.pending = Some(PendingBackend { listener, info });
        Ok(())
    }

    /// Spawn the accept loop for the listener bound by [`init`](Self::init).
    ///
    /// # Errors
    ///
    /// - [`BackendError::AlreadyStarted`] if the backend is running
    /// - [`BackendError::NotInitialized`] if `init` has not succeeded
    /// - [`BackendError::Start`] if called outside a tokio runtime
    pub fn start(&mut self) -> Result<(), BackendError> {
        if self.is_started() {
            return Err(BackendError::AlreadyStarted {
                message: String::from("start called on a started backend"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let runtime = RuntimeHandle::try_current().map_err(|e| BackendError::Start {
            message: format!("No tokio runtime to run the backend on: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let PendingBackend { listener, info } =
            self.state.pending.take().ok_or_else(|| BackendError::NotInitialized {
                message: String::from("start called before a successful init"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let port = info.port;
        runtime.spawn(server::accept_loop(
            listener,
            info.secret.clone(),
            Arc::clone(&self.backend.connections),
            self.backend.handshake_timeout,
        ));

        self.backend
            .running
            .set(info)
            .map_err(|_| BackendError::AlreadyStarted {
                message: String::from("backend info was already published"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("SparkR backend started on {BACKEND_HOSTNAME}:{port}");
        Ok(())
    }

    pub fn port(&self) -> Option<u16> {
        self.backend.port()
    }

    pub fn socket_secret(&self) -> Option<&RedactedSecret> {
        self.backend.socket_secret()
    }

    #[track_caller]
    fn info(&self) -> Result<BackendInfo, BackendError> {
        self.backend.info().ok_or_else(|| BackendError::NotInitialized {
            message: String::from("backend is not started"),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    #[cfg(test)]
    pub(crate) fn init_calls(&self) -> usize {
        self.state.init_calls
    }

    #[cfg(test)]
    pub(crate) fn set_bind_address(&mut self, bind_address: impl Into<String>) {
        self.state.bind_address = bind_address.into();
    }
}
