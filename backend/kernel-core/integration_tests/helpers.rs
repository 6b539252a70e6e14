//! Test helpers for kernel-core integration tests.
//!
//! - Fake kernel gateways speaking the framed execute protocol
//! - A kernel-side backend connection authenticating like `SparkR:::connectBackend`
//! - Extracting connection values from a rendered bootstrap script

use kernel_core::backend::auth::{AUTH_OK, MAX_AUTH_STRING_LEN, read_string, write_string};
use kernel_core::frame::{read_frame, write_frame};

use models::{ExecuteRequest, ExecuteResponse};

use std::net::SocketAddr;
use std::sync::Arc;

use regex::Regex;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

/// Test helper: Serve `respond` on a loopback gateway and return its address.
pub async fn spawn_gateway<F>(respond: F) -> SocketAddr
where
    F: Fn(&ExecuteRequest) -> ExecuteResponse + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake gateway");
    let addr = listener.local_addr().expect("Fake gateway has no address");
    let respond = Arc::new(respond);

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let respond = Arc::clone(&respond);
            tokio::spawn(async move {
                while let Ok(request) = read_frame::<_, ExecuteRequest>(&mut stream).await {
                    let response = respond(&request);
                    if write_frame(&mut stream, &response).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    addr
}

/// Test helper: Gateway that behaves like an IR kernel running the bootstrap script.
///
/// It reads the port and secret out of the script, connects back to the backend,
/// performs the handshake and answers SUCCESS only if the backend accepted it.
/// Accepted backend connections are kept open in the returned vector.
pub async fn spawn_connecting_gateway() -> (SocketAddr, Arc<Mutex<Vec<TcpStream>>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake gateway");
    let addr = listener.local_addr().expect("Fake gateway has no address");
    let held = Arc::new(Mutex::new(Vec::new()));
    let held_clone = Arc::clone(&held);

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let held = Arc::clone(&held_clone);
            tokio::spawn(async move {
                while let Ok(request) = read_frame::<_, ExecuteRequest>(&mut stream).await {
                    let response = match script_connection(&request.code) {
                        Some((port, secret)) => match connect_back(port, &secret).await {
                            Ok((backend_stream, true)) => {
                                held.lock().await.push(backend_stream);
                                ExecuteResponse::success("connected")
                            }
                            Ok((_, false)) => ExecuteResponse::error("backend rejected secret"),
                            Err(e) => ExecuteResponse::error(format!("connect failed: {e}")),
                        },
                        None => ExecuteResponse::error("script has no connection values"),
                    };
                    if write_frame(&mut stream, &response).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    (addr, held)
}

/// Test helper: Pull `port` and `authSecret` assignments out of a rendered script.
pub fn script_connection(code: &str) -> Option<(u16, String)> {
    let port_re = Regex::new(r"port <- (\d+)").expect("valid regex pattern");
    let secret_re = Regex::new(r#"authSecret <- "([^"]*)""#).expect("valid regex pattern");

    let port = port_re.captures(code)?[1].parse().ok()?;
    let secret = secret_re.captures(code)?[1].to_string();
    Some((port, secret))
}

/// Test helper: Connect to the backend the way the bootstrap script does.
///
/// With a secret, sends it as a SparkR string and reports whether the reply was
/// `"ok"`. Without one (secrets disabled), connects without authenticating.
pub async fn connect_back(port: u16, secret: &str) -> std::io::Result<(TcpStream, bool)> {
    let mut stream = TcpStream::connect(("127.0.0.1", port)).await?;

    if secret.is_empty() {
        return Ok((stream, true));
    }

    write_string(&mut stream, secret)
        .await
        .map_err(std::io::Error::other)?;

    let reply = read_string(&mut stream, MAX_AUTH_STRING_LEN)
        .await
        .map_err(std::io::Error::other)?;

    Ok((stream, reply == AUTH_OK))
}

/// Test helper: Poll until `check` holds or ~2 seconds pass.
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    check()
}
