// Unit tests for backend init/start sequencing
// Connection-level behaviour is covered in integration_tests/backend

use crate::BACKEND_BIND_ADDRESS;
use crate::backend::SparkRBackend;
use crate::error::backend::BackendError;

use std::sync::Arc;

use futures_util::future::join_all;

/// **VALUE**: The central guarantee - concurrent opens initialize the backend exactly once.
///
/// **WHY THIS MATTERS**: Notebook hosts open many sessions at once. Two initializations
/// would bind two ports and generate two secrets; half the kernels would then be told
/// to connect to a backend nobody serves.
///
/// **BUG THIS CATCHES**: Would catch the started check moving outside the lifecycle lock,
/// or `ensure_started` taking the lock twice (check, release, init).
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_concurrent_callers_when_ensure_started_then_init_runs_once() {
    // GIVEN: A fresh backend shared by 32 callers
    let backend = Arc::new(SparkRBackend::new());

    // WHEN: All of them race to start it
    let tasks = (0..32).map(|_| {
        let backend = Arc::clone(&backend);
        tokio::spawn(async move { backend.ensure_started(true).await })
    });
    let results = join_all(tasks).await;

    // THEN: Every caller sees the same port and secret
    let infos: Vec<_> = results
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();
    let first = &infos[0];
    assert!(infos.iter().all(|info| info == first));
    assert!(first.secret.is_some());

    // AND: init ran exactly once
    assert_eq!(backend.lock().await.init_calls(), 1);
    assert_eq!(backend.port(), Some(first.port));
}

/// **VALUE**: Verifies port and secret are only visible after start.
///
/// **BUG THIS CATCHES**: Would catch `init` publishing connection info before the accept
/// loop is running, letting a session bootstrap a kernel against a dead port.
#[tokio::test]
async fn given_initialized_backend_when_not_started_then_port_is_hidden() {
    // GIVEN: A backend after init but before start
    let backend = SparkRBackend::new();
    let mut guard = backend.lock().await;
    guard.init(true).await.unwrap();

    // THEN: Still unstarted with no connection info
    assert!(!guard.is_started());
    assert_eq!(guard.port(), None);
    assert!(guard.socket_secret().is_none());

    // WHEN: Starting it
    guard.start().unwrap();

    // THEN: Connection info is published
    assert!(guard.is_started());
    assert!(guard.port().is_some());
    assert!(guard.socket_secret().is_some());
}

/// **VALUE**: Verifies `start` refuses to run without a successful `init`.
///
/// **BUG THIS CATCHES**: Would catch `start` marking the backend started with no listener.
#[tokio::test]
async fn given_uninitialized_backend_when_start_called_then_not_initialized_error() {
    let backend = SparkRBackend::new();
    let mut guard = backend.lock().await;

    let result = guard.start();

    assert!(matches!(result, Err(BackendError::NotInitialized { .. })));
    assert!(!guard.is_started());
}

/// **VALUE**: Verifies a failed `init` leaves the backend unstarted and retryable.
///
/// **WHY THIS MATTERS**: A transient bind failure must fail only the session that hit it.
/// If the backend were marked started without a listener, every later session would
/// bootstrap its kernel against a port nobody serves.
///
/// **BUG THIS CATCHES**: Would catch publishing connection info before the bind succeeds,
/// or a failed attempt poisoning the lifecycle so the next opener cannot retry.
#[tokio::test]
async fn given_init_failure_when_next_caller_ensures_started_then_retry_succeeds() {
    // GIVEN: A backend whose bind address cannot be bound
    let backend = SparkRBackend::new();
    let mut guard = backend.lock().await;
    guard.set_bind_address("127.0.0.1:not-a-port");

    // WHEN: Initializing
    let result = guard.init(true).await;

    // THEN: Init error, nothing published, start refuses without a listener
    assert!(matches!(result, Err(BackendError::Init { .. })));
    assert!(!guard.is_started());
    assert_eq!(guard.port(), None);
    assert!(guard.socket_secret().is_none());
    assert!(matches!(
        guard.start(),
        Err(BackendError::NotInitialized { .. })
    ));

    // WHEN: The next opener arrives with a bindable address
    guard.set_bind_address(BACKEND_BIND_ADDRESS);
    drop(guard);
    let info = backend.ensure_started(true).await.unwrap();

    // THEN: It initializes and starts the backend
    assert!(backend.is_started());
    assert_eq!(backend.port(), Some(info.port));
    assert_eq!(backend.lock().await.init_calls(), 2);
}

/// **VALUE**: Verifies a started backend cannot be re-initialized.
///
/// **WHY THIS MATTERS**: Re-running `init` would rotate the secret under kernels that
/// already authenticated with the old one.
///
/// **BUG THIS CATCHES**: Would catch the started check being dropped from `init`.
#[tokio::test]
async fn given_started_backend_when_init_called_then_already_started_error() {
    // GIVEN: A started backend
    let backend = SparkRBackend::new();
    let before = backend.ensure_started(true).await.unwrap();

    // WHEN: Calling init again under the lock
    let mut guard = backend.lock().await;
    let result = guard.init(true).await;

    // THEN: Rejected, connection info unchanged
    assert!(matches!(result, Err(BackendError::AlreadyStarted { .. })));
    assert_eq!(guard.init_calls(), 1);
    drop(guard);
    assert_eq!(backend.info(), Some(before));
}

#[tokio::test]
async fn given_secret_disabled_when_started_then_no_secret_is_generated() {
    let backend = SparkRBackend::new();

    let info = backend.ensure_started(false).await.unwrap();

    assert!(info.secret.is_none());
    assert!(backend.socket_secret().is_none());
    assert_eq!(info.secret_value(), "");
}

/// **VALUE**: Verifies `get()` hands out one shared instance.
///
/// **BUG THIS CATCHES**: Would catch `get()` constructing a new backend per call, which
/// silently defeats the single-initialization guarantee.
#[test]
fn given_repeated_calls_when_get_called_then_same_instance_returned() {
    let a = SparkRBackend::get();
    let b = SparkRBackend::get();

    assert!(Arc::ptr_eq(&a, &b));
}
