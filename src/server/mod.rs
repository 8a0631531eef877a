//! Listening socket and accept loop.

pub mod listener;
pub mod name;

pub use listener::Server;
