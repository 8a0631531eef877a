use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use bytes::Bytes;

use crate::error::EngineError;
use crate::http::parser::parse_request_line;
use crate::http::response::StartResponse;
use crate::wsgi::environ::{ServerInfo, build_environ, process_environ};
use crate::wsgi::handler::Handler;

/// The application side of the server: the active handler plus the fixed
/// metadata fed into every environ.
#[derive(Clone)]
pub struct Gateway {
    handler: Arc<dyn Handler>,
    server: ServerInfo,
    server_ident: String,
}

impl Gateway {
    pub fn new(handler: Arc<dyn Handler>, server: ServerInfo, server_ident: impl Into<String>) -> Self {
        Self {
            handler,
            server,
            server_ident: server_ident.into(),
        }
    }

    pub fn server(&self) -> &ServerInfo {
        &self.server
    }

    pub fn server_ident(&self) -> &str {
        &self.server_ident
    }

    /// Turns one raw request into the bytes of its response.
    ///
    /// Parses the request line, builds a fresh environ over the current
    /// process environment, invokes the handler and renders what it
    /// declared. A panic inside the handler or its body is reported as
    /// [`EngineError::Handler`].
    pub fn dispatch(&self, raw: Bytes, peer: Option<SocketAddr>) -> Result<Vec<u8>, EngineError> {
        let request = parse_request_line(&raw)?;

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            version = %request.version,
            "Dispatching request"
        );

        let mut environ = build_environ(&request, &self.server, peer, raw, process_environ());
        let mut start_response = StartResponse::new(self.server_ident.as_str());

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let body = self
                .handler
                .call(&mut environ, &mut start_response)
                .map_err(EngineError::Handler)?;
            start_response.render(body)
        }));

        match outcome {
            Ok(result) => result,
            Err(payload) => Err(EngineError::Handler(anyhow::anyhow!(
                "handler panicked: {}",
                panic_message(payload.as_ref())
            ))),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic"
    }
}
