use clap::Parser;
use tracing_subscriber::EnvFilter;

use simple_wsgi::config::Config;
use simple_wsgi::server::Server;
use simple_wsgi::wsgi::apps;

#[derive(Debug, Parser)]
#[command(name = "simple_wsgi", version, about = "Serve a registered application one request at a time")]
struct Cli {
    /// Application to serve, as module:callable (e.g. hello:app)
    app: String,

    /// Interface to bind; empty binds all interfaces
    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let mut cfg = Config::load()?;
    if let Some(host) = cli.host {
        cfg.server.host = host;
    }
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }

    let handler = apps::registry().resolve(&cli.app)?;
    let server = Server::bind(&cfg, handler).await?;

    println!("SimpleWSGI: Serving HTTP on port {} ...\n", server.port());

    tokio::select! {
        res = server.serve() => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
