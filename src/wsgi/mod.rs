//! Application invocation contract.
//!
//! - **`environ`**: builds the per-request call environment
//! - **`handler`**: the `Handler` trait, response bodies and the name registry
//! - **`gateway`**: parse → environ → handler → render for one raw request
//! - **`apps`**: applications shipped with the binary

pub mod apps;
pub mod environ;
pub mod gateway;
pub mod handler;

pub use environ::{EnvValue, Environ, ServerInfo};
pub use gateway::Gateway;
pub use handler::{Body, Handler, HandlerRegistry};
