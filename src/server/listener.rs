use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::{TcpListener, TcpSocket, lookup_host};
use tracing::info;

use crate::config::Config;
use crate::http::connection::Connection;
use crate::server::name::resolve_server_name;
use crate::wsgi::environ::ServerInfo;
use crate::wsgi::gateway::Gateway;
use crate::wsgi::handler::Handler;

/// The listening socket plus everything needed to answer a request on it.
///
/// Connections are serviced strictly one after another: the next accept
/// only happens once the previous connection is closed.
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    gateway: Gateway,
    read_limit: usize,
}

impl Server {
    /// Binds the configured address and resolves the server name once.
    pub async fn bind(cfg: &Config, handler: Arc<dyn Handler>) -> anyhow::Result<Self> {
        let bind_addr = cfg.server.bind_addr();
        let addr = lookup_host(bind_addr.as_str())
            .await
            .with_context(|| format!("failed to resolve {}", bind_addr))?
            .next()
            .with_context(|| format!("no address for {}", bind_addr))?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket
            .bind(addr)
            .with_context(|| format!("failed to bind {}", addr))?;
        let listener = socket.listen(cfg.server.backlog)?;

        let local_addr = listener.local_addr()?;
        let server = ServerInfo {
            name: resolve_server_name(&local_addr),
            port: local_addr.port(),
        };
        info!(addr = %local_addr, server_name = %server.name, "Listening");

        Ok(Self {
            listener,
            local_addr,
            gateway: Gateway::new(handler, server, cfg.engine.server_ident.as_str()),
            read_limit: cfg.engine.read_limit,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    pub fn server_name(&self) -> &str {
        &self.gateway.server().name
    }

    /// Accept loop. Only a failing accept ends it; request failures are
    /// logged and the loop moves on to the next connection.
    pub async fn serve(&self) -> anyhow::Result<()> {
        loop {
            self.serve_once().await?;
        }
    }

    /// Accepts one connection and services it to completion.
    pub async fn serve_once(&self) -> anyhow::Result<()> {
        let (socket, peer) = self.listener.accept().await?;
        info!("Accepted connection from {}", peer);

        let conn = Connection::new(socket, Some(peer), &self.gateway, self.read_limit);
        if let Err(e) = conn.run().await {
            tracing::error!(peer = %peer, error = %e, "Request failed");
        }

        Ok(())
    }
}
