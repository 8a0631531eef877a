/// The first line of an HTTP request, split into its three tokens.
///
/// Tokens are kept exactly as received: no method case folding and no
/// percent-decoding of the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// Request method (e.g. "GET"), any casing
    pub method: String,
    /// Request target (e.g. "/hello?name=x")
    pub path: String,
    /// Protocol version token (e.g. "HTTP/1.1")
    pub version: String,
}

impl RequestLine {
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            version: version.into(),
        }
    }
}

impl std::fmt::Display for RequestLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.method, self.path, self.version)
    }
}
