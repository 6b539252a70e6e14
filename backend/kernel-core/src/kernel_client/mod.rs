//! Execute seam between the bootstrapper and a running kernel.
//!
//! Process management and the execute transport belong to the host. The
//! bootstrapper only needs one blocking request/response call, expressed by
//! [`KernelClient`]. [`tcp::TcpKernelClient`] is the framed-protobuf
//! implementation used by the launcher.

pub mod tcp;

use crate::error::execute::ExecuteError;

use models::{ExecuteRequest, ExecuteResponse};

use std::future::Future;

pub trait KernelClient: Send + Sync {
    /// Run `request` and wait for its terminal response.
    fn block_execute(
        &self,
        request: ExecuteRequest,
    ) -> impl Future<Output = Result<ExecuteResponse, ExecuteError>> + Send;
}
