mod backend;
mod bootstrap;

use crate::error::execute::ExecuteError;
use crate::kernel_client::KernelClient;

use models::{ExecuteRequest, ExecuteResponse};

use std::future::pending;
use std::sync::Mutex;

/// Kernel that answers every execute with a canned response and records the requests.
pub(crate) struct StubKernel {
    response: ExecuteResponse,
    requests: Mutex<Vec<ExecuteRequest>>,
}

impl StubKernel {
    pub(crate) fn answering(response: ExecuteResponse) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<ExecuteRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl KernelClient for StubKernel {
    async fn block_execute(&self, request: ExecuteRequest) -> Result<ExecuteResponse, ExecuteError> {
        self.requests.lock().unwrap().push(request);
        Ok(self.response.clone())
    }
}

/// Kernel that never answers.
pub(crate) struct SilentKernel;

impl KernelClient for SilentKernel {
    async fn block_execute(&self, _request: ExecuteRequest) -> Result<ExecuteResponse, ExecuteError> {
        pending().await
    }
}
