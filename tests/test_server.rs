use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use simple_wsgi::config::Config;
use simple_wsgi::http::response::StartResponse;
use simple_wsgi::server::Server;
use simple_wsgi::wsgi::environ::Environ;
use simple_wsgi::wsgi::handler::{Body, Handler, body};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

fn local_config() -> Config {
    let mut cfg = Config::default();
    cfg.server.host = "127.0.0.1".to_string();
    cfg.server.port = 0;
    cfg
}

async fn start_server(handler: Arc<dyn Handler>) -> SocketAddr {
    let server = Server::bind(&local_config(), handler).await.unwrap();
    let addr = server.local_addr();
    tokio::spawn(async move {
        let _ = server.serve().await;
    });
    addr
}

async fn send(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    timeout(Duration::from_secs(5), async {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request).await.unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        response
    })
    .await
    .expect("server did not close the connection")
}

fn hi_handler() -> Arc<dyn Handler> {
    Arc::new(
        |_env: &mut Environ, start: &mut StartResponse| -> anyhow::Result<Body> {
            start.declare("200 OK", [("Content-Type", "text/plain")]);
            Ok(body([Bytes::from_static(b"hi")]))
        },
    )
}

fn echo_handler() -> Arc<dyn Handler> {
    Arc::new(
        |env: &mut Environ, start: &mut StartResponse| -> anyhow::Result<Body> {
            let line = format!(
                "{} {} {}",
                env.get_str("REQUEST_METHOD").unwrap_or("-"),
                env.get_str("PATH_INFO").unwrap_or("-"),
                env.get_str("wsgi.url_scheme").unwrap_or("-"),
            );
            start.declare("200 OK", [("Content-Type", "text/plain")]);
            Ok(body([Bytes::from(line)]))
        },
    )
}

#[tokio::test]
async fn test_hello_end_to_end() {
    let addr = start_server(hi_handler()).await;

    let raw = send(addr, b"GET /hello HTTP/1.1\r\n\r\n").await;
    let text = String::from_utf8(raw).unwrap();

    let (head, body) = text.split_once("\r\n\r\n").unwrap();
    let lines: Vec<&str> = head.split("\r\n").collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "HTTP/200 OK");
    assert_eq!(lines[1], "Content-Type: text/plain");
    assert!(lines[2].starts_with("Date: "));
    assert_eq!(lines[3], "Server: SimpleWSGI 0.1");
    assert_eq!(body, "hi");
}

#[tokio::test]
async fn test_empty_request_closes_without_response() {
    let addr = start_server(hi_handler()).await;

    let raw = send(addr, b"\r\n").await;
    assert!(raw.is_empty());

    // The loop keeps accepting.
    let raw = send(addr, b"GET / HTTP/1.1\r\n\r\n").await;
    assert!(raw.ends_with(b"\r\n\r\nhi"));
}

#[tokio::test]
async fn test_missing_version_closes_without_response() {
    let addr = start_server(hi_handler()).await;

    let raw = send(addr, b"GET /\r\n\r\n").await;
    assert!(raw.is_empty());

    let raw = send(addr, b"GET / HTTP/1.1\r\n\r\n").await;
    assert!(raw.starts_with(b"HTTP/200 OK\r\n"));
}

#[tokio::test]
async fn test_sequential_requests_do_not_leak() {
    let addr = start_server(echo_handler()).await;

    let first = send(addr, b"POST /first HTTP/1.1\r\n\r\n").await;
    let second = send(addr, b"get /second HTTP/1.0\r\n\r\n").await;

    assert!(first.ends_with(b"\r\n\r\nPOST /first http"));
    assert!(second.ends_with(b"\r\n\r\nget /second http"));
}

#[tokio::test]
async fn test_input_carries_raw_request() {
    let handler: Arc<dyn Handler> = Arc::new(
        |env: &mut Environ, start: &mut StartResponse| -> anyhow::Result<Body> {
            let mut raw = Vec::new();
            if let Some(input) = env.input() {
                std::io::Read::read_to_end(input, &mut raw)?;
            }
            start.declare("200 OK", [("Content-Type", "application/octet-stream")]);
            Ok(body([Bytes::from(raw)]))
        },
    );
    let addr = start_server(handler).await;

    let request = b"POST /upload HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
    let raw = send(addr, request).await;

    let (_, payload) = raw.split_at(raw.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4);
    assert_eq!(payload, request);
}

#[tokio::test]
async fn test_handler_error_gets_internal_error() {
    let failing: Arc<dyn Handler> = Arc::new(
        |_env: &mut Environ, _start: &mut StartResponse| -> anyhow::Result<Body> {
            anyhow::bail!("database unavailable")
        },
    );
    let addr = start_server(failing).await;

    let raw = send(addr, b"GET / HTTP/1.1\r\n\r\n").await;
    let text = String::from_utf8(raw).unwrap();

    assert!(text.starts_with("HTTP/500 Internal Server Error\r\n"));
    assert!(text.ends_with("500 Internal Server Error"));

    // Still serving.
    let raw = send(addr, b"GET / HTTP/1.1\r\n\r\n").await;
    assert!(raw.starts_with(b"HTTP/500 Internal Server Error\r\n"));
}

#[tokio::test]
async fn test_handler_panic_gets_internal_error() {
    let panicking: Arc<dyn Handler> = Arc::new(
        |env: &mut Environ, start: &mut StartResponse| -> anyhow::Result<Body> {
            if env.get_str("PATH_INFO") == Some("/boom") {
                panic!("handler exploded");
            }
            start.declare("200 OK", Vec::<(String, String)>::new());
            Ok(body([Bytes::from_static(b"fine")]))
        },
    );
    let addr = start_server(panicking).await;

    let raw = send(addr, b"GET /boom HTTP/1.1\r\n\r\n").await;
    assert!(raw.starts_with(b"HTTP/500 Internal Server Error\r\n"));

    let raw = send(addr, b"GET /ok HTTP/1.1\r\n\r\n").await;
    assert!(raw.ends_with(b"\r\n\r\nfine"));
}

#[tokio::test]
async fn test_undeclared_response_gets_internal_error() {
    let silent: Arc<dyn Handler> = Arc::new(
        |_env: &mut Environ, _start: &mut StartResponse| -> anyhow::Result<Body> {
            Ok(body([Bytes::from_static(b"never sent")]))
        },
    );
    let addr = start_server(silent).await;

    let raw = send(addr, b"GET / HTTP/1.1\r\n\r\n").await;
    let text = String::from_utf8(raw).unwrap();

    assert!(text.starts_with("HTTP/500 Internal Server Error\r\n"));
    assert!(!text.contains("never sent"));
}

#[tokio::test]
async fn test_serve_once_handles_single_connection() {
    let server = Server::bind(&local_config(), hi_handler()).await.unwrap();
    let addr = server.local_addr();

    assert_eq!(server.port(), addr.port());
    assert!(!server.server_name().is_empty());

    let client = tokio::spawn(async move { send(addr, b"GET / HTTP/1.1\r\n\r\n").await });

    timeout(Duration::from_secs(5), server.serve_once())
        .await
        .unwrap()
        .unwrap();

    let raw = client.await.unwrap();
    assert!(raw.ends_with(b"\r\n\r\nhi"));
}
