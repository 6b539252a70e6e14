use crate::error::execute::ExecuteError;
use crate::frame::{read_frame, write_frame};
use crate::kernel_client::KernelClient;

use common::ErrorLocation;
use models::{ExecuteRequest, ExecuteResponse};

use std::panic::Location;
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, info, trace};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::sleep as TokioSleep;

const CONNECT_MAX_ELAPSED: Duration = Duration::from_secs(20);

/// Kernel client speaking length-prefixed [`ExecuteRequest`]/[`ExecuteResponse`]
/// frames to a kernel gateway.
///
/// The connection is opened lazily on the first execute and reused. A
/// transport failure drops it so the next call reconnects.
pub struct TcpKernelClient {
    address: String,
    connect_max_elapsed: Duration,
    stream: Mutex<Option<TcpStream>>,
}

impl TcpKernelClient {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            connect_max_elapsed: CONNECT_MAX_ELAPSED,
            stream: Mutex::new(None),
        }
    }

    /// How long to keep retrying the initial connection.
    pub fn with_connect_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.connect_max_elapsed = max_elapsed;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    async fn connect(&self) -> Result<TcpStream, ExecuteError> {
        let mut backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.connect_max_elapsed),
            ..Default::default()
        };

        debug!("Connecting to kernel gateway at {}", self.address);

        loop {
            match TcpStream::connect(&self.address).await {
                Ok(stream) => {
                    info!("Connected to kernel gateway at {}", self.address);
                    return Ok(stream);
                }
                Err(e) => match backoff.next_backoff() {
                    Some(duration) => {
                        trace!(
                            "Kernel gateway at {} not reachable ({e}), retrying after {duration:?}",
                            self.address
                        );
                        TokioSleep(duration).await;
                    }
                    None => {
                        return Err(ExecuteError::Connect {
                            message: format!(
                                "Kernel gateway at {} unreachable within {:?}: {e}",
                                self.address, self.connect_max_elapsed
                            ),
                            location: ErrorLocation::from(Location::caller()),
                            source: Box::new(e),
                        });
                    }
                },
            }
        }
    }
}

impl KernelClient for TcpKernelClient {
    async fn block_execute(&self, request: ExecuteRequest) -> Result<ExecuteResponse, ExecuteError> {
        let mut slot = self.stream.lock().await;

        let mut stream = match slot.take() {
            Some(stream) => stream,
            None => self.connect().await?,
        };

        trace!("Sending execute request ({} bytes of code)", request.code.len());

        write_frame(&mut stream, &request).await?;
        let response: ExecuteResponse = read_frame(&mut stream).await?;

        // Only a clean exchange puts the connection back for reuse.
        *slot = Some(stream);
        Ok(response)
    }
}
