use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Environment variable naming an optional YAML configuration file.
pub const CONFIG_ENV: &str = "SIMPLE_WSGI_CONFIG";
/// Overrides `server.host`.
pub const HOST_ENV: &str = "SIMPLE_WSGI_HOST";
/// Overrides `server.port`.
pub const PORT_ENV: &str = "SIMPLE_WSGI_PORT";

pub const DEFAULT_PORT: u16 = 8888;
pub const DEFAULT_BACKLOG: u32 = 1;
pub const DEFAULT_READ_LIMIT: usize = 1024;
pub const DEFAULT_SERVER_IDENT: &str = "SimpleWSGI 0.1";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub engine: EngineConfig,
}

/// Where the listening socket binds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Empty string binds all interfaces.
    pub host: String,
    pub port: u16,
    pub backlog: u32,
}

/// Per-request limits and identification.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Byte ceiling of the single read performed per connection.
    pub read_limit: usize,
    /// Value of the `Server` header appended to every response.
    pub server_ident: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            backlog: DEFAULT_BACKLOG,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            read_limit: DEFAULT_READ_LIMIT,
            server_ident: DEFAULT_SERVER_IDENT.to_string(),
        }
    }
}

impl ServerConfig {
    /// Socket address string suitable for binding. An empty host means every interface.
    pub fn bind_addr(&self) -> String {
        let host = if self.host.is_empty() {
            "0.0.0.0"
        } else {
            self.host.as_str()
        };
        format!("{}:{}", host, self.port)
    }
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// `SIMPLE_WSGI_CONFIG` names a YAML file used as the base layer;
    /// `SIMPLE_WSGI_HOST` and `SIMPLE_WSGI_PORT` override it.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match lookup(CONFIG_ENV) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Some(host) = lookup(HOST_ENV) {
            cfg.server.host = host;
        }

        if let Some(port) = lookup(PORT_ENV) {
            cfg.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("invalid {} value: {:?}", PORT_ENV, port))?;
        }

        Ok(cfg)
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("invalid configuration YAML")
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
    }
}
