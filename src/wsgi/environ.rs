//! The call environment handed to a handler for every request.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::net::SocketAddr;

use bytes::buf::Reader;
use bytes::{Buf, Bytes};

use crate::http::request::RequestLine;

/// Keys every environ carries before the handler is invoked.
pub const REQUIRED_KEYS: [&str; 11] = [
    "wsgi.version",
    "wsgi.input",
    "wsgi.errors",
    "wsgi.multithread",
    "wsgi.multiprocess",
    "wsgi.run_once",
    "wsgi.url_scheme",
    "REQUEST_METHOD",
    "PATH_INFO",
    "SERVER_NAME",
    "SERVER_PORT",
];

/// Protocol version advertised in `wsgi.version`.
pub const WSGI_VERSION: (u8, u8) = (1, 0);

/// Name and port of the bound listening socket, fixed at bind time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub name: String,
    pub port: u16,
}

/// One value in the environ.
#[derive(Debug)]
pub enum EnvValue {
    Str(String),
    Bool(bool),
    Version(u8, u8),
    Input(RequestInput),
    Errors(ErrorStream),
}

/// `wsgi.input`: the raw bytes read from the connection, readable front to back once.
#[derive(Debug)]
pub struct RequestInput {
    reader: Reader<Bytes>,
}

impl RequestInput {
    pub fn new(raw: Bytes) -> Self {
        Self {
            reader: raw.reader(),
        }
    }

    /// Bytes not yet read.
    pub fn remaining(&self) -> usize {
        self.reader.get_ref().remaining()
    }
}

impl Read for RequestInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

/// `wsgi.errors`: diagnostics written here land on the process's standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorStream;

impl Write for ErrorStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::stderr().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stderr().flush()
    }
}

/// String-keyed mapping describing one request plus protocol metadata.
#[derive(Debug, Default)]
pub struct Environ {
    vars: BTreeMap<String, EnvValue>,
}

impl Environ {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: EnvValue) {
        self.vars.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&EnvValue> {
        self.vars.get(key)
    }

    /// Value of a string entry, `None` if absent or not a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.vars.get(key) {
            Some(EnvValue::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.vars.get(key) {
            Some(EnvValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn version(&self) -> Option<(u8, u8)> {
        match self.vars.get("wsgi.version") {
            Some(EnvValue::Version(major, minor)) => Some((*major, *minor)),
            _ => None,
        }
    }

    /// The request body stream (`wsgi.input`).
    pub fn input(&mut self) -> Option<&mut RequestInput> {
        match self.vars.get_mut("wsgi.input") {
            Some(EnvValue::Input(input)) => Some(input),
            _ => None,
        }
    }

    /// The error sink (`wsgi.errors`).
    pub fn errors(&mut self) -> Option<&mut ErrorStream> {
        match self.vars.get_mut("wsgi.errors") {
            Some(EnvValue::Errors(errors)) => Some(errors),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnvValue)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Snapshot of the process environment as strings.
///
/// Names or values that are not valid UTF-8 are carried with replacement
/// characters instead of being dropped.
pub fn process_environ() -> Vec<(String, String)> {
    std::env::vars_os()
        .map(|(key, value)| {
            (
                key.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        })
        .collect()
}

/// Builds a fresh environ for one request.
///
/// `inherited` is the process environment snapshot and forms the base
/// layer. Protocol keys are written afterwards, so an inherited variable
/// with the same name never shadows them. `wsgi.url_scheme` is `https`
/// only when the inherited `HTTPS` variable is `on` or `1`.
pub fn build_environ<I>(
    request: &RequestLine,
    server: &ServerInfo,
    peer: Option<SocketAddr>,
    raw: Bytes,
    inherited: I,
) -> Environ
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut environ = Environ::new();

    for (key, value) in inherited {
        environ.insert(key, EnvValue::Str(value));
    }

    let url_scheme = match environ.get_str("HTTPS") {
        Some("on" | "1") => "https",
        _ => "http",
    };

    let (major, minor) = WSGI_VERSION;
    environ.insert("wsgi.version", EnvValue::Version(major, minor));
    environ.insert("wsgi.input", EnvValue::Input(RequestInput::new(raw)));
    environ.insert("wsgi.errors", EnvValue::Errors(ErrorStream));
    environ.insert("wsgi.multithread", EnvValue::Bool(false));
    environ.insert("wsgi.multiprocess", EnvValue::Bool(true));
    environ.insert("wsgi.run_once", EnvValue::Bool(true));
    environ.insert("wsgi.url_scheme", EnvValue::Str(url_scheme.to_string()));
    environ.insert("REQUEST_METHOD", EnvValue::Str(request.method.clone()));
    environ.insert("PATH_INFO", EnvValue::Str(request.path.clone()));
    environ.insert("SERVER_PROTOCOL", EnvValue::Str(request.version.clone()));
    environ.insert("SERVER_NAME", EnvValue::Str(server.name.clone()));
    environ.insert("SERVER_PORT", EnvValue::Str(server.port.to_string()));

    if let Some(addr) = peer {
        environ.insert("REMOTE_ADDR", EnvValue::Str(addr.ip().to_string()));
    }

    environ
}
