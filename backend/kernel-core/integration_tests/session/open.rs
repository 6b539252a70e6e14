use crate::helpers::{eventually, spawn_connecting_gateway, spawn_gateway};

use kernel_core::backend::SparkRBackend;
use kernel_core::bootstrap::KernelCapabilities;
use kernel_core::config::InterpreterProperties;
use kernel_core::error::CoreError;
use kernel_core::error::bootstrap::BootstrapError;
use kernel_core::kernel_client::tcp::TcpKernelClient;
use kernel_core::session::IrKernelSession;

use models::ExecuteResponse;

use std::sync::Arc;

use futures_util::future::join_all;

// ============================================================================
// End-to-end open sequence
// Real backend, real TCP kernel client, fake kernel gateway that connects back
// ============================================================================

fn session_for(
    backend: &Arc<SparkRBackend>,
    gateway: std::net::SocketAddr,
) -> IrKernelSession<TcpKernelClient> {
    IrKernelSession::new(
        Arc::clone(backend),
        InterpreterProperties::new(),
        KernelCapabilities::default(),
        TcpKernelClient::new(gateway.to_string()),
    )
}

/// **VALUE**: Verifies concurrently opened sessions share one backend and every
/// kernel authenticates against it.
///
/// **WHY THIS MATTERS**: Notebooks open several R paragraphs at once; each kernel must
/// end up connected to the same backend with the same secret.
///
/// **BUG THIS CATCHES**: Would catch a racing session starting a second backend, which
/// leaves earlier kernels talking to a port nobody serves.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_concurrent_sessions_when_opened_then_all_kernels_connect_to_one_backend() {
    // GIVEN: One fresh backend and a gateway per session
    const SESSIONS: usize = 6;
    let backend = Arc::new(SparkRBackend::new());
    let (gateway, _held) = spawn_connecting_gateway().await;
    let sessions: Vec<_> = (0..SESSIONS).map(|_| session_for(&backend, gateway)).collect();

    // WHEN: All open at once
    let results = join_all(sessions.iter().map(|session| session.open())).await;

    // THEN: All succeed with identical connection values
    let infos: Vec<_> = results.into_iter().map(|r| r.unwrap()).collect();
    let first = &infos[0];
    for info in &infos {
        assert_eq!(info.port, first.port);
        assert_eq!(info.secret_value(), first.secret_value());
    }

    // AND: Every kernel holds an authenticated backend connection
    assert!(eventually(|| backend.connected_kernels() == SESSIONS).await);
}

/// **VALUE**: Verifies a kernel-side failure surfaces as a bootstrap error with the
/// kernel's output.
///
/// **BUG THIS CATCHES**: Would catch the kernel's diagnostic text being dropped,
/// leaving users with no clue why the session failed.
#[tokio::test]
async fn given_gateway_reporting_error_when_opened_then_bootstrap_error_with_output() {
    // GIVEN: A gateway whose script evaluation fails
    let backend = Arc::new(SparkRBackend::new());
    let gateway = spawn_gateway(|_| ExecuteResponse::error("there is no package called 'SparkR'")).await;
    let session = session_for(&backend, gateway);

    // WHEN: Opening
    let error = session.open().await.unwrap_err();

    // THEN: Bootstrap error carrying the output
    assert!(matches!(
        error,
        CoreError::Bootstrap(BootstrapError::Kernel { .. })
    ));
    assert!(error.to_string().contains("there is no package called 'SparkR'"));

    // AND: The backend stays started for other sessions
    assert!(backend.is_started());
}

/// **VALUE**: Verifies reopening keeps the backend and re-authenticates the kernel.
///
/// **BUG THIS CATCHES**: Would catch a reopen rebinding the backend to a new port.
#[tokio::test]
async fn given_opened_session_when_opened_again_then_same_backend_port() {
    let backend = Arc::new(SparkRBackend::new());
    let (gateway, _held) = spawn_connecting_gateway().await;
    let session = session_for(&backend, gateway);

    let first = session.open().await.unwrap();
    let second = session.open().await.unwrap();

    assert_eq!(first.port, second.port);
    assert!(eventually(|| backend.connected_kernels() == 2).await);
}
