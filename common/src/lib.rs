//! Shared primitives for the IR kernel workspace.
//!
//! This crate holds the small pieces every other crate leans on:
//!
//! - [`ErrorLocation`] - file/line/column captured at the error site
//! - [`RedactedSecret`] - a backend secret that never leaks into logs
//!
//! ## Architecture
//!
//! - **common** (this crate): Error plumbing and secret handling
//! - **models**: Wire messages and backend connection info
//! - **kernel-core**: Backend lifecycle, script rendering, kernel bootstrap
//! - **ir-launcher**: Binary wiring everything together

pub mod error;
pub mod redacted_secret;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use redacted_secret::RedactedSecret;
