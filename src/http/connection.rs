use std::net::SocketAddr;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::EngineError;
use crate::http::response::internal_error;
use crate::http::writer::ResponseWriter;
use crate::wsgi::gateway::Gateway;

/// One accepted connection, serviced for exactly one request.
pub struct Connection<'g, S> {
    stream: S,
    peer: Option<SocketAddr>,
    gateway: &'g Gateway,
    read_limit: usize,
    state: ConnectionState,
    failure: Option<EngineError>,
}

pub enum ConnectionState {
    Reading,
    Dispatching(Bytes),
    Writing(ResponseWriter),
    Closed,
}

impl<'g, S> Connection<'g, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: Option<SocketAddr>, gateway: &'g Gateway, read_limit: usize) -> Self {
        Self {
            stream,
            peer,
            gateway,
            read_limit,
            state: ConnectionState::Reading,
            failure: None,
        }
    }

    /// Drives the connection to `Closed` and releases the stream.
    ///
    /// The stream is shut down and dropped on every path. A request-level
    /// failure is returned after the connection is closed; when the handler
    /// failed, a best-effort `500` has already been written.
    pub async fn run(mut self) -> Result<(), EngineError> {
        let result = self.drive().await;

        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(error = %e, "Shutdown after response failed");
        }

        result?;
        match self.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn drive(&mut self) -> Result<(), EngineError> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    let raw = self.read_request().await?;
                    self.state = ConnectionState::Dispatching(raw);
                }

                ConnectionState::Dispatching(raw) => {
                    let rendered = match self.gateway.dispatch(raw, self.peer) {
                        Ok(rendered) => rendered,
                        Err(e) if e.wants_error_response() => {
                            let fallback = internal_error(self.gateway.server_ident());
                            self.failure = Some(e);
                            fallback
                        }
                        Err(e) => return Err(e),
                    };
                    self.state = ConnectionState::Writing(ResponseWriter::new(rendered));
                }

                ConnectionState::Writing(mut writer) => {
                    writer.trace_lines();
                    writer.write_to_stream(&mut self.stream).await?;
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Performs the single bounded read. Anything past `read_limit` is
    /// left unread.
    async fn read_request(&mut self) -> Result<Bytes, EngineError> {
        let mut buf = vec![0u8; self.read_limit];
        let n = self.stream.read(&mut buf).await?;
        buf.truncate(n);

        for line in String::from_utf8_lossy(&buf).lines() {
            tracing::debug!("< {}", line);
        }

        Ok(Bytes::from(buf))
    }
}
