//! Applications bundled with the binary.

use std::io::Read;

use bytes::Bytes;

use crate::http::response::StartResponse;
use crate::wsgi::environ::{EnvValue, Environ};
use crate::wsgi::handler::{Body, HandlerRegistry, body};

pub const HELLO_BODY: &str = "Hello world from a simple WSGI application!\n";

/// Registry with every bundled application.
pub fn registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry
        .register("hello:app", hello)
        .register("environ:app", environ_dump);
    registry
}

/// Plain-text greeting.
pub fn hello(_environ: &mut Environ, start_response: &mut StartResponse) -> anyhow::Result<Body> {
    start_response.declare("200 OK", [("Content-Type", "text/plain")]);
    Ok(body([Bytes::from_static(HELLO_BODY.as_bytes())]))
}

/// Echoes the environ back, one `key = value` line per entry, followed by
/// the number of request bytes available on `wsgi.input`.
pub fn environ_dump(
    environ: &mut Environ,
    start_response: &mut StartResponse,
) -> anyhow::Result<Body> {
    let mut raw = Vec::new();
    if let Some(input) = environ.input() {
        input.read_to_end(&mut raw)?;
    }

    let mut lines: Vec<String> = environ
        .iter()
        .map(|(key, value)| format!("{} = {}\n", key, describe(value)))
        .collect();
    lines.push(format!("input bytes = {}\n", raw.len()));

    start_response.declare("200 OK", [("Content-Type", "text/plain; charset=utf-8")]);
    Ok(body(lines.into_iter().map(Bytes::from)))
}

fn describe(value: &EnvValue) -> String {
    match value {
        EnvValue::Str(s) => s.clone(),
        EnvValue::Bool(b) => b.to_string(),
        EnvValue::Version(major, minor) => format!("({}, {})", major, minor),
        EnvValue::Input(_) => "<input>".to_string(),
        EnvValue::Errors(_) => "<stderr>".to_string(),
    }
}
