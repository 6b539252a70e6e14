//! Accept loop for kernels connecting back to the shared backend.
//!
//! Every connection must:
//!
//! 1. Come from a loopback address (others are dropped silently)
//! 2. When secrets are enabled, send the secret as a SparkR string within
//!    the handshake timeout (see [`auth`](crate::backend::auth))
//!
//! The backend answers `"ok"` or `"err"`. Rejected, silent or oversized
//! peers are closed. Accepted ones are held open and counted until the
//! kernel disconnects.

use crate::backend::auth::{AUTH_ERR, AUTH_OK, MAX_AUTH_STRING_LEN, read_string, write_string};
use crate::backend::connection_state::ConnectionState;
use crate::error::frame::FrameError;

use common::RedactedSecret;

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::io::{copy, sink};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn as TokioSpawn;
use tokio::time::timeout as TokioTimeout;

/// Decrements the live connection count when an authenticated kernel goes away.
struct ConnectionGuard {
    connections: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    fn register(connections: Arc<AtomicUsize>) -> Self {
        connections.fetch_add(1, Ordering::SeqCst);
        Self { connections }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.connections.fetch_sub(1, Ordering::SeqCst);
    }
}

pub(crate) async fn accept_loop(
    listener: TcpListener,
    expected_secret: Option<RedactedSecret>,
    connections: Arc<AtomicUsize>,
    handshake_timeout: Duration,
) {
    while let Ok((stream, addr)) = listener.accept().await {
        debug!("Kernel connecting from {addr}");
        let state = ConnectionState::new(expected_secret.clone());
        let connections = Arc::clone(&connections);

        TokioSpawn(async move {
            if let Err(e) =
                handle_connection(stream, addr, state, connections, handshake_timeout).await
            {
                warn!("Backend connection from {addr} ended with error: {e}");
            }
        });
    }

    error!("Backend accept loop stopped - kernels can no longer connect");
}

async fn handle_connection(
    mut stream: TcpStream,
    addr: SocketAddr,
    mut state: ConnectionState,
    connections: Arc<AtomicUsize>,
    handshake_timeout: Duration,
) -> Result<(), FrameError> {
    if !addr.ip().is_loopback() {
        warn!("Rejected non-loopback backend connection from {addr}");
        return Ok(());
    }

    if state.requires_secret() {
        let presented = match TokioTimeout(
            handshake_timeout,
            read_string(&mut stream, MAX_AUTH_STRING_LEN),
        )
        .await
        {
            Ok(presented) => presented?,
            Err(_) => {
                warn!("Kernel at {addr} sent no secret within {handshake_timeout:?}");
                return Ok(());
            }
        };

        if !state.validate_secret(&presented) {
            warn!("Kernel at {addr} presented an invalid backend secret");
            write_string(&mut stream, AUTH_ERR).await?;
            return Ok(());
        }

        write_string(&mut stream, AUTH_OK).await?;
    } else {
        state.validate_secret("");
    }

    let _guard = ConnectionGuard::register(connections);
    info!(
        "Kernel at {addr} connected to backend (authenticated={})",
        state.is_authenticated()
    );

    // Payload traffic belongs to the kernel-side runtime; hold the socket until it closes.
    let drained = copy(&mut stream, &mut sink()).await?;

    info!("Kernel at {addr} disconnected after {drained} bytes");
    Ok(())
}
