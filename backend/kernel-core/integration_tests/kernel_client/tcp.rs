use crate::helpers::spawn_gateway;

use kernel_core::error::execute::ExecuteError;
use kernel_core::frame::read_frame;
use kernel_core::kernel_client::KernelClient;
use kernel_core::kernel_client::tcp::TcpKernelClient;

use models::{ExecuteRequest, ExecuteResponse};

use std::time::Duration;

use tokio::net::TcpListener;

/// **VALUE**: Verifies the client round-trips framed requests and reuses its connection.
///
/// **WHY THIS MATTERS**: The launcher drives real kernels through this client; a framing
/// mismatch would fail every bootstrap with a decode error.
///
/// **BUG THIS CATCHES**: Would catch length-prefix or decode regressions, and the
/// connection being dropped after a clean exchange.
#[tokio::test]
async fn given_echo_gateway_when_block_execute_called_twice_then_both_succeed() {
    // GIVEN: A gateway echoing the code back as output
    let addr = spawn_gateway(|request| ExecuteResponse::success(request.code.clone())).await;
    let client = TcpKernelClient::new(addr.to_string());

    // WHEN: Executing twice
    let first = client
        .block_execute(ExecuteRequest::new("1 + 1"))
        .await
        .unwrap();
    let second = client
        .block_execute(ExecuteRequest::new("print('hi')"))
        .await
        .unwrap();

    // THEN: Both answered in order
    assert!(first.is_success());
    assert_eq!(first.output, "1 + 1");
    assert_eq!(second.output, "print('hi')");
}

/// **VALUE**: Verifies an unreachable gateway ends in a Connect error once backoff runs out.
///
/// **BUG THIS CATCHES**: Would catch the retry loop spinning forever.
#[tokio::test]
async fn given_unreachable_gateway_when_block_execute_called_then_connect_error() {
    // GIVEN: An address nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = TcpKernelClient::new(addr.to_string())
        .with_connect_max_elapsed(Duration::from_millis(300));

    // WHEN: Executing
    let result = client.block_execute(ExecuteRequest::new("1")).await;

    // THEN: Connect error
    assert!(matches!(result, Err(ExecuteError::Connect { .. })));
}

/// **VALUE**: Verifies a gateway hanging up mid-exchange is reported as Closed.
///
/// **BUG THIS CATCHES**: Would catch EOF being reported as a generic transport error,
/// hiding that the kernel process died.
#[tokio::test]
async fn given_gateway_that_hangs_up_when_block_execute_called_then_closed_error() {
    // GIVEN: A gateway that reads the request then closes without answering
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            let _ = read_frame::<_, ExecuteRequest>(&mut stream).await;
            drop(stream);
        }
    });

    let client = TcpKernelClient::new(addr.to_string());

    // WHEN: Executing
    let result = client.block_execute(ExecuteRequest::new("1")).await;

    // THEN: Closed
    assert!(matches!(result, Err(ExecuteError::Closed { .. })), "{result:?}");
}
