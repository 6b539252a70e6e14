//! Wire messages and connection models for the IR kernel bootstrap.
//!
//! Everything here is plain data: protobuf messages exchanged with the
//! kernel gateway, plus the validated [`BackendInfo`] handed to the
//! bootstrapper.

pub mod backend_info;
pub mod error;
pub mod execute;


pub use backend_info::BackendInfo;
pub use backend_info::builder::BackendInfoBuilder;
pub use common::ErrorLocation;
pub use error::model_error::ModelError;
pub use execute::{ExecuteRequest, ExecuteResponse, ExecuteStatus};
