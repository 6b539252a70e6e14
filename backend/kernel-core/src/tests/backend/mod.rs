mod auth;
mod connection_state;
mod lifecycle;
