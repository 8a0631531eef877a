use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Holds one fully rendered response and pushes it onto a connection.
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(rendered: Vec<u8>) -> Self {
        Self {
            buffer: rendered,
            written: 0,
        }
    }

    /// Logs the outgoing bytes line by line, prefixed like `curl -v`.
    pub fn trace_lines(&self) {
        for line in String::from_utf8_lossy(&self.buffer).lines() {
            tracing::debug!("> {}", line);
        }
    }

    /// Writes every remaining byte and flushes.
    pub async fn write_to_stream<S>(&mut self, stream: &mut S) -> std::io::Result<()>
    where
        S: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "connection closed while writing",
                ));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
