use bytes::Bytes;
use chrono::Local;

use crate::error::EngineError;

/// `strftime` pattern of the server-managed `Date` header (local time).
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Status text and headers declared by a handler, including the two
/// server-managed headers appended at declaration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    /// Status line text as given by the handler, e.g. "200 OK"
    pub status: String,
    /// Headers in declaration order; `Date` and `Server` come last
    pub headers: Vec<(String, String)>,
}

/// The declaration half of the two-phase response protocol.
///
/// A handler calls [`StartResponse::declare`] once with its status and
/// headers, then returns its body. The engine later calls
/// [`StartResponse::render`] with that body to obtain the bytes that go on
/// the wire. Declaring twice is tolerated; the last declaration wins.
#[derive(Debug)]
pub struct StartResponse {
    server_ident: String,
    head: Option<ResponseHead>,
}

impl StartResponse {
    pub fn new(server_ident: impl Into<String>) -> Self {
        Self {
            server_ident: server_ident.into(),
            head: None,
        }
    }

    /// Records the response status and headers.
    ///
    /// Nothing is sent yet. `Date` and `Server` are appended after the
    /// handler's own headers without any deduplication by name.
    ///
    /// # Example
    ///
    /// ```
    /// # use simple_wsgi::http::response::StartResponse;
    /// let mut start = StartResponse::new("SimpleWSGI 0.1");
    /// start.declare("200 OK", [("Content-Type", "text/plain")]);
    ///
    /// let head = start.head().unwrap();
    /// assert_eq!(head.headers[0].0, "Content-Type");
    /// assert_eq!(head.headers[1].0, "Date");
    /// assert_eq!(head.headers[2], ("Server".to_string(), "SimpleWSGI 0.1".to_string()));
    /// ```
    pub fn declare<I, N, V>(&mut self, status: impl Into<String>, headers: I)
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let mut headers: Vec<(String, String)> = headers
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();

        headers.push(("Date".to_string(), Local::now().format(DATE_FORMAT).to_string()));
        headers.push(("Server".to_string(), self.server_ident.clone()));

        self.head = Some(ResponseHead {
            status: status.into(),
            headers,
        });
    }

    /// The current declaration, if any.
    pub fn head(&self) -> Option<&ResponseHead> {
        self.head.as_ref()
    }

    pub fn is_declared(&self) -> bool {
        self.head.is_some()
    }

    /// Serializes the declared head followed by every body fragment in order.
    ///
    /// The body is consumed exactly once. No `Content-Length` is computed;
    /// the client sees the end of the message when the connection closes.
    pub fn render<B>(&self, body: B) -> Result<Vec<u8>, EngineError>
    where
        B: IntoIterator<Item = Bytes>,
    {
        let head = self.head.as_ref().ok_or(EngineError::ResponseNotDeclared)?;

        let mut buf = Vec::new();

        // Status line
        buf.extend_from_slice(b"HTTP/");
        buf.extend_from_slice(head.status.as_bytes());
        buf.extend_from_slice(b"\r\n");

        // Headers
        for (name, value) in &head.headers {
            buf.extend_from_slice(name.as_bytes());
            buf.extend_from_slice(b": ");
            buf.extend_from_slice(value.as_bytes());
            buf.extend_from_slice(b"\r\n");
        }

        // Header/body separator
        buf.extend_from_slice(b"\r\n");

        // Body
        for fragment in body {
            buf.extend_from_slice(&fragment);
        }

        Ok(buf)
    }
}

/// A complete `500 Internal Server Error` response, used when a handler
/// fails after the connection has been read.
pub fn internal_error(server_ident: &str) -> Vec<u8> {
    let mut start = StartResponse::new(server_ident);
    start.declare(
        "500 Internal Server Error",
        [("Content-Type", "text/plain")],
    );

    start
        .render([Bytes::from_static(b"500 Internal Server Error")])
        .unwrap_or_default()
}
