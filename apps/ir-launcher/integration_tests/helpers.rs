//! Test helpers for launcher integration tests.

use kernel_core::frame::{read_frame, write_frame};

use models::{ExecuteRequest, ExecuteResponse};

use std::net::SocketAddr;

use tokio::net::TcpListener;

/// Test helper: Gateway answering every execute with a clone of `response`.
pub async fn spawn_gateway(response: ExecuteResponse) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake gateway");
    let addr = listener.local_addr().expect("Fake gateway has no address");

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let response = response.clone();
            tokio::spawn(async move {
                while read_frame::<_, ExecuteRequest>(&mut stream).await.is_ok() {
                    if write_frame(&mut stream, &response).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    addr
}
