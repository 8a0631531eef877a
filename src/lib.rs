//! SimpleWSGI - a single-connection HTTP server
//!
//! Adapts raw socket bytes into a call environment, invokes a registered
//! handler through the declare-then-stream response protocol and writes
//! the result back, one connection at a time.

pub mod config;
pub mod error;
pub mod http;
pub mod server;
pub mod wsgi;
