//! Request-scoped failures.
//!
//! Every variant is confined to the connection that produced it: the
//! accept loop logs it, closes the socket and moves on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The request line did not split into method, path and version.
    #[error("malformed request line: {0:?}")]
    MalformedRequest(String),

    /// Rendering was attempted before the handler declared a status.
    #[error("response rendered before start_response was called")]
    ResponseNotDeclared,

    /// The handler failed (or panicked) while producing its response.
    #[error("handler failed: {0}")]
    Handler(#[source] anyhow::Error),

    /// Reading from or writing to the client socket failed.
    #[error("connection I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Whether a best-effort error response should still be written.
    pub fn wants_error_response(&self) -> bool {
        matches!(
            self,
            EngineError::ResponseNotDeclared | EngineError::Handler(_)
        )
    }
}
