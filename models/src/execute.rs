//! Execute protocol between the host and a kernel gateway.
//!
//! A request carries source code; the response is terminal and carries a
//! status plus whatever the kernel printed.

/// Outcome of a single execute call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ExecuteStatus {
    Success = 0,
    Error = 1,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ExecuteRequest {
    #[prost(string, tag = "1")]
    pub code: String,
}

impl ExecuteRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ExecuteResponse {
    #[prost(enumeration = "ExecuteStatus", tag = "1")]
    pub status: i32,
    #[prost(string, tag = "2")]
    pub output: String,
}

impl ExecuteResponse {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            status: ExecuteStatus::Success as i32,
            output: output.into(),
        }
    }

    pub fn error(output: impl Into<String>) -> Self {
        Self {
            status: ExecuteStatus::Error as i32,
            output: output.into(),
        }
    }

    /// Unknown status codes count as failures.
    pub fn is_success(&self) -> bool {
        matches!(ExecuteStatus::try_from(self.status), Ok(ExecuteStatus::Success))
    }
}
