//! Server configuration.
//!
//! Values come from an optional YAML file and are then overridden by
//! `MWS_*` environment variables:
//!
//! ```yaml
//! host: 0.0.0.0
//! port: 8080
//! document_root: ./mws_root
//! read_timeout_ms: 5000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;

/// Environment variable naming a YAML config file.
pub const CONFIG_ENV: &str = "MWS_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub document_root: PathBuf,
    /// File served for targets ending in `/`.
    pub index_file: String,
    /// Value of the `Server` response header.
    pub server_name: String,
    /// Capacity of the request line buffer, CRLF included.
    pub max_line_len: usize,
    pub read_timeout_ms: u64,
    pub backlog: u32,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 80,
            document_root: PathBuf::from("./mws_root"),
            index_file: "index.html".to_string(),
            server_name: "Minimal Web Server".to_string(),
            max_line_len: 500,
            read_timeout_ms: 10_000,
            backlog: 20,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads the file named by `MWS_CONFIG` (or the defaults) and applies
    /// environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        // An empty document deserializes as unit, not as an empty map.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Overrides fields from `MWS_*` variables resolved through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("MWS_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("MWS_PORT") {
            self.port = port
                .parse()
                .with_context(|| format!("MWS_PORT is not a valid port: {port:?}"))?;
        }
        if let Some(root) = lookup("MWS_ROOT") {
            self.document_root = PathBuf::from(root);
        }
        if let Some(index) = lookup("MWS_INDEX") {
            self.index_file = index;
        }
        if let Some(name) = lookup("MWS_SERVER_NAME") {
            self.server_name = name;
        }
        if let Some(len) = lookup("MWS_MAX_LINE") {
            self.max_line_len = len
                .parse()
                .with_context(|| format!("MWS_MAX_LINE is not a number: {len:?}"))?;
        }
        if let Some(ms) = lookup("MWS_READ_TIMEOUT_MS") {
            self.read_timeout_ms = ms
                .parse()
                .with_context(|| format!("MWS_READ_TIMEOUT_MS is not a number: {ms:?}"))?;
        }
        if let Some(backlog) = lookup("MWS_BACKLOG") {
            self.backlog = backlog
                .parse()
                .with_context(|| format!("MWS_BACKLOG is not a number: {backlog:?}"))?;
        }
        if let Some(level) = lookup("MWS_LOG") {
            self.log_level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_line_len < 3 {
            bail!("max_line_len must be at least 3, got {}", self.max_line_len);
        }
        if self.read_timeout_ms == 0 {
            bail!("read_timeout_ms must be > 0");
        }
        if self.backlog == 0 {
            bail!("backlog must be > 0");
        }
        if self.index_file.is_empty() || self.index_file.contains('/') {
            bail!("index_file must be a plain file name, got {:?}", self.index_file);
        }
        if self.server_name.contains(['\r', '\n']) {
            bail!("server_name must not contain line breaks");
        }
        self.level()?;
        Ok(())
    }

    /// Address to bind, `host:port`. IPv6 literals are bracketed.
    pub fn listen_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn level(&self) -> anyhow::Result<tracing::Level> {
        self.log_level
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown log level {:?}", self.log_level))
    }
}
