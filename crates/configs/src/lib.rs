use std::env;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

/// Connection-string schemes understood by the document store layer.
pub const SUPPORTED_STORE_SCHEMES: [&str; 4] = ["postgres://", "postgresql://", "file://", "memory://"];

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Path prefix the resource routes are nested under, e.g. `/api`.
    #[serde(default)]
    pub api_prefix: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            worker_threads: None,
            api_prefix: String::new(),
            service_name: default_service_name(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            sqlx_logging: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `compact` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 3001 }
fn default_service_name() -> String { "resource-api".into() }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 10 }
fn default_log_format() -> String { "compact".into() }
fn default_store_url() -> String { "memory://".into() }

pub fn config_path() -> String {
    env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    AppConfig::from_toml_str(&content)
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(content)?;
        Ok(cfg)
    }

    /// Build a config purely from environment variables.
    pub fn from_env() -> Result<Self> {
        let mut cfg = AppConfig::default();
        if let Ok(host) = env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Ok(port) = env::var("PORT").or_else(|_| env::var("SERVER_PORT")) {
            cfg.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("invalid port {port:?}"))?;
        }
        if let Some(threads) = env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse().ok()) {
            cfg.server.worker_threads = Some(threads);
        }
        if let Ok(prefix) = env::var("API_PREFIX") {
            cfg.server.api_prefix = prefix;
        }
        if let Ok(format) = env::var("LOG_FORMAT") {
            cfg.logging.format = format;
        }
        Ok(cfg)
    }

    /// Load `config.toml` (or `CONFIG_PATH`) when present, otherwise the environment,
    /// then normalize and validate.
    pub fn load_and_validate() -> Result<Self> {
        let path = config_path();
        let mut cfg = if Path::new(&path).exists() { load_from_file(&path)? } else { Self::from_env()? };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.normalize_from_env();
        self.store.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        let prefix = self.api_prefix.trim().trim_end_matches('/');
        self.api_prefix = match prefix {
            "" => String::new(),
            p if p.starts_with('/') => p.to_string(),
            p => format!("/{p}"),
        };
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StoreConfig {
    /// Fill an empty URL from `STORE_URL`, then `DATABASE_URL`, then `memory://`.
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            self.url = env::var("STORE_URL")
                .or_else(|_| env::var("DATABASE_URL"))
                .unwrap_or_else(|_| default_store_url());
        }
    }

    pub fn validate(&self) -> Result<()> {
        let lower = self.url.trim().to_lowercase();
        if lower.is_empty() {
            return Err(anyhow!("store.url is empty; set it in config.toml or STORE_URL"));
        }
        if !SUPPORTED_STORE_SCHEMES.iter().any(|s| lower.starts_with(s)) {
            return Err(anyhow!(
                "store.url must start with one of {}",
                SUPPORTED_STORE_SCHEMES.join(", ")
            ));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("store.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("store.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(anyhow!("store.connect_timeout_secs must be a positive number of seconds"));
        }
        Ok(())
    }
}
