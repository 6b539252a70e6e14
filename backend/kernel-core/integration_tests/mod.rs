mod backend;
mod error;
mod helpers;
mod kernel_client;
mod session;
