use bytes::Bytes;
use simple_wsgi::http::response::StartResponse;
use simple_wsgi::wsgi::apps::{self, HELLO_BODY};
use simple_wsgi::wsgi::environ::{Environ, ServerInfo, build_environ};
use simple_wsgi::wsgi::handler::{Body, HandlerRegistry, body};
use simple_wsgi::http::request::RequestLine;

fn environ(raw: &'static [u8]) -> Environ {
    let line = RequestLine::new("GET", "/", "HTTP/1.1");
    let server = ServerInfo {
        name: "localhost".to_string(),
        port: 8888,
    };
    build_environ(&line, &server, None, Bytes::from_static(raw), Vec::new())
}

#[test]
fn test_bundled_apps_are_registered() {
    let registry = apps::registry();
    let names: Vec<&str> = registry.names().collect();
    assert_eq!(names, vec!["environ:app", "hello:app"]);
}

#[test]
fn test_resolve_and_call_hello() {
    let handler = apps::registry().resolve("hello:app").unwrap();
    let mut start = StartResponse::new("test");
    let mut env = environ(b"GET / HTTP/1.1\r\n\r\n");

    let body = handler.call(&mut env, &mut start).unwrap();
    let raw = start.render(body).unwrap();

    assert!(raw.starts_with(b"HTTP/200 OK\r\nContent-Type: text/plain\r\n"));
    assert!(raw.ends_with(HELLO_BODY.as_bytes()));
}

#[test]
fn test_environ_app_reports_input_length() {
    let handler = apps::registry().resolve("environ:app").unwrap();
    let mut start = StartResponse::new("test");
    let mut env = environ(b"GET / HTTP/1.1\r\n\r\n");

    let body = handler.call(&mut env, &mut start).unwrap();
    let text = String::from_utf8(start.render(body).unwrap()).unwrap();

    assert!(text.contains("REQUEST_METHOD = GET\n"));
    assert!(text.contains("wsgi.version = (1, 0)\n"));
    assert!(text.contains("wsgi.multithread = false\n"));
    assert!(text.ends_with("input bytes = 18\n"));
}

#[test]
fn test_resolve_unknown_name() {
    let err = apps::registry().resolve("missing:app").err().unwrap();
    let message = err.to_string();
    assert!(message.contains("missing:app"));
    assert!(message.contains("hello:app"));
}

#[test]
fn test_resolve_requires_colon() {
    assert!(apps::registry().resolve("hello").is_err());
    assert!(apps::registry().resolve(":app").is_err());
    assert!(apps::registry().resolve("hello:").is_err());
}

#[test]
fn test_register_closure() {
    let mut registry = HandlerRegistry::new();
    registry.register(
        "custom:handler",
        |_env: &mut Environ, start: &mut StartResponse| -> anyhow::Result<Body> {
            start.declare("201 Created", [("Location", "/things/1")]);
            Ok(body(Vec::new()))
        },
    );

    let handler = registry.resolve("custom:handler").unwrap();
    let mut start = StartResponse::new("test");
    let mut env = environ(b"");
    let body = handler.call(&mut env, &mut start).unwrap();
    let raw = start.render(body).unwrap();

    assert!(raw.starts_with(b"HTTP/201 Created\r\nLocation: /things/1\r\n"));
    assert!(raw.ends_with(b"\r\n\r\n"));
}
