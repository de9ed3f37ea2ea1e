use crate::assets::{StaticAsset, duckdb_wasm_assets};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("expected HOST:PORT (e.g. 127.0.0.1:8000): {0}")]
    InvalidAddress(String),
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub host: String,
    pub port: u16,
    pub uploads_dir: PathBuf,
    pub static_dir: PathBuf,
    /// Download the DuckDB-WASM assets used by `/client` at startup.
    pub provision_assets: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            uploads_dir: PathBuf::from("uploads"),
            static_dir: PathBuf::from("static"),
            provision_assets: true,
        }
    }
}

impl EngineConfig {
    pub fn addr(&self) -> String {
        join_host_port(&self.host, self.port)
    }

    /// Place `uploads/` and `static/` under `dir`.
    pub fn set_data_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.uploads_dir = dir.as_ref().join("uploads");
        self.static_dir = dir.as_ref().join("static");
        self
    }

    pub fn set_uploads_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.uploads_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn set_static_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.static_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn set_listen(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn set_provision_assets(mut self, enabled: bool) -> Self {
        self.provision_assets = enabled;
        self
    }

    /// Browser-side assets kept under the static dir.
    pub fn assets(&self) -> Vec<StaticAsset> {
        duckdb_wasm_assets(&self.static_dir)
    }

    pub fn http(&self) -> HttpServerConfig {
        self.into()
    }
}

#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl HttpServerConfig {
    pub fn addr(&self) -> String {
        join_host_port(&self.host, self.port)
    }
}

impl From<&EngineConfig> for HttpServerConfig {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            host: cfg.host.clone(),
            port: cfg.port,
        }
    }
}

fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

/// Parse `HOST:PORT`, accepting bracketed IPv6 hosts such as `[::1]:8000`.
pub fn parse_host_port(s: &str) -> Result<(String, u16), ConfigError> {
    let invalid = |why: &str| ConfigError::InvalidAddress(format!("{why} in `{s}`"));
    if let Some(rest) = s.strip_prefix('[') {
        // bracketed IPv6: [host]:port
        let end = rest
            .find(']')
            .ok_or_else(|| invalid("invalid bracketed IPv6 address"))?;
        let host = &rest[..end];
        let port = rest[end + 1..]
            .strip_prefix(':')
            .ok_or_else(|| invalid("missing port after IPv6 host"))?;
        let port: u16 = port.parse().map_err(|_| invalid("invalid port"))?;
        return Ok((host.to_string(), port));
    }
    let (host, port) = s.rsplit_once(':').ok_or_else(|| invalid("missing port"))?;
    if host.is_empty() {
        return Err(invalid("missing host"));
    }
    let port: u16 = port.parse().map_err(|_| invalid("invalid port"))?;
    Ok((host.to_string(), port))
}
