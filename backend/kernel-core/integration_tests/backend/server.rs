use crate::helpers::{connect_back, eventually};

use kernel_core::backend::SparkRBackend;

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout as TokioTimeout;

// ============================================================================
// Public API tests for the backend accept loop
// These connect to a started backend the way a kernel would
// ============================================================================

/// **VALUE**: Verifies a kernel presenting the right secret is accepted and counted.
///
/// **WHY THIS MATTERS**: This is the whole point of the bootstrap: the kernel ends up with
/// an authenticated connection to the shared backend.
///
/// **BUG THIS CATCHES**: Would catch the accept loop not being spawned by `start`, or the
/// handshake comparing against the wrong secret.
#[tokio::test]
async fn given_correct_secret_when_kernel_connects_then_accepted_and_counted() {
    // GIVEN: A started backend with secrets enabled
    let backend = Arc::new(SparkRBackend::new());
    let info = backend.ensure_started(true).await.unwrap();

    // WHEN: A kernel connects with the real secret
    let (stream, accepted) = connect_back(info.port, info.secret_value()).await.unwrap();

    // THEN: Accepted and visible in the live count
    assert!(accepted);
    assert!(eventually(|| backend.connected_kernels() == 1).await);

    // AND: The count drops when the kernel disconnects
    drop(stream);
    assert!(eventually(|| backend.connected_kernels() == 0).await);
}

/// **VALUE**: Verifies a wrong secret is rejected and never counted.
///
/// **WHY THIS MATTERS**: Any local user can reach a loopback port; the secret is what
/// keeps other processes out of the backend.
///
/// **BUG THIS CATCHES**: Would catch the handshake result being ignored.
#[tokio::test]
async fn given_wrong_secret_when_kernel_connects_then_rejected() {
    // GIVEN: A started backend with secrets enabled
    let backend = Arc::new(SparkRBackend::new());
    let info = backend.ensure_started(true).await.unwrap();

    // WHEN: Presenting a wrong secret
    let (_stream, accepted) = connect_back(info.port, "not-the-secret").await.unwrap();

    // THEN: Rejected
    assert!(!accepted);
    assert_eq!(backend.connected_kernels(), 0);
}

/// **VALUE**: Verifies secrets-disabled backends accept an empty secret.
///
/// **BUG THIS CATCHES**: Would catch older SparkR kernels being locked out.
#[tokio::test]
async fn given_secret_disabled_when_kernel_connects_without_secret_then_accepted() {
    let backend = Arc::new(SparkRBackend::new());
    let info = backend.ensure_started(false).await.unwrap();

    let (_stream, accepted) = connect_back(info.port, "").await.unwrap();

    assert!(accepted);
    assert!(eventually(|| backend.connected_kernels() == 1).await);
}

/// **VALUE**: Pins the byte-level exchange `SparkR:::connectBackend` performs.
///
/// **WHY THIS MATTERS**: The bundled script authenticates through SparkR itself; the
/// backend has to accept exactly what SparkR's `writeString` sends and answer in a form
/// its `readString` accepts, or no real kernel can ever connect.
///
/// **BUG THIS CATCHES**: Would catch the backend expecting any other framing for the
/// secret (protobuf, no terminator, little-endian length).
#[tokio::test]
async fn given_sparkr_encoded_secret_when_sent_raw_then_ok_reply_and_counted() {
    // GIVEN: A started backend with secrets enabled
    let backend = Arc::new(SparkRBackend::new());
    let info = backend.ensure_started(true).await.unwrap();
    let secret = info.secret_value().as_bytes();

    // WHEN: Writing int32(len + 1) ++ secret ++ NUL by hand
    let mut stream = TcpStream::connect(("127.0.0.1", info.port)).await.unwrap();
    let mut auth = ((secret.len() + 1) as i32).to_be_bytes().to_vec();
    auth.extend_from_slice(secret);
    auth.push(0);
    stream.write_all(&auth).await.unwrap();

    // THEN: Reply is the SparkR string "ok"
    let mut reply = [0u8; 7];
    stream.read_exact(&mut reply).await.unwrap();
    assert_eq!(reply, [0, 0, 0, 3, b'o', b'k', 0]);
    assert!(eventually(|| backend.connected_kernels() == 1).await);
}

/// **VALUE**: Verifies a peer that never authenticates is dropped after the handshake timeout.
///
/// **BUG THIS CATCHES**: Would catch the secret read having no deadline, leaking one
/// task per idle loopback connection for the life of the process.
#[tokio::test]
async fn given_silent_peer_when_handshake_timeout_passes_then_connection_closed() {
    // GIVEN: A backend with a short handshake timeout
    let backend = Arc::new(
        SparkRBackend::new().with_handshake_timeout(Duration::from_millis(200)),
    );
    let info = backend.ensure_started(true).await.unwrap();

    // WHEN: Connecting and sending nothing
    let mut stream = TcpStream::connect(("127.0.0.1", info.port)).await.unwrap();

    // THEN: The backend closes the connection without counting it
    let mut buf = [0u8; 8];
    let read = TokioTimeout(Duration::from_secs(5), stream.read(&mut buf))
        .await
        .expect("backend should close a silent peer");
    assert!(matches!(read, Ok(0) | Err(_)));
    assert_eq!(backend.connected_kernels(), 0);
}

/// **VALUE**: Verifies an oversized secret length is refused without a reply.
///
/// **BUG THIS CATCHES**: Would catch an unauthenticated peer being able to make the
/// backend allocate and wait for megabytes.
#[tokio::test]
async fn given_oversized_secret_length_when_sent_then_closed_without_reply() {
    let backend = Arc::new(SparkRBackend::new());
    let info = backend.ensure_started(true).await.unwrap();

    let mut stream = TcpStream::connect(("127.0.0.1", info.port)).await.unwrap();
    stream
        .write_all(&(16 * 1024 * 1024i32).to_be_bytes())
        .await
        .unwrap();

    let mut buf = [0u8; 8];
    let read = TokioTimeout(Duration::from_secs(5), stream.read(&mut buf))
        .await
        .expect("backend should close an oversized handshake");
    assert!(matches!(read, Ok(0) | Err(_)));
    assert_eq!(backend.connected_kernels(), 0);
}
