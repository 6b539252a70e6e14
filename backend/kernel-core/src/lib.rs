pub mod backend;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod frame;
pub mod kernel_client;
pub mod session;
pub mod template;

#[cfg(test)]
mod tests;

/// Name the host uses to select this kernel implementation.
pub const KERNEL_NAME: &str = "ir";
pub const BACKEND_HOSTNAME: &str = "127.0.0.1";
pub const BACKEND_BIND_ADDRESS: &str = const_format::concatcp!(BACKEND_HOSTNAME, ":0");
