use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Deserializer};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Process configuration, read once before the store is opened.
///
/// Accepts both the historical flat JSON layout
/// (`{"data_file": ..., "port": "8080", "admin_password": ...}`) and TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port", deserialize_with = "port_from_number_or_string")]
    pub port: u16,
    #[serde(default)]
    pub admin_password: String,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            host: default_host(),
            port: default_port(),
            admin_password: String::new(),
            worker_threads: Some(4),
        }
    }
}

fn default_data_file() -> PathBuf { PathBuf::from("data/kv.json") }
fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 8080 }

fn port_from_number_or_string<'de, D>(de: D) -> std::result::Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Num(u16),
        Str(String),
    }
    match Port::deserialize(de)? {
        Port::Num(n) => Ok(n),
        Port::Str(s) => s.trim().parse::<u16>().map_err(serde::de::Error::custom),
    }
}

/// Parse a config file; `.toml` files are read as TOML, everything else as JSON.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
    let cfg: AppConfig = if is_toml {
        toml::from_str(&content)
            .with_context(|| format!("cannot parse TOML config {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("cannot parse JSON config {}", path.display()))?
    };
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut cfg = load_from_file(path)?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.normalize_from_env()?;
        self.normalize();
        self.validate()
    }

    /// `KV_DATA_FILE` and `KV_PORT` override file values; `KV_ADMIN_PASSWORD`
    /// only fills a blank password.
    pub fn normalize_from_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("KV_DATA_FILE") {
            if !path.trim().is_empty() {
                self.data_file = PathBuf::from(path);
            }
        }
        if let Ok(port) = std::env::var("KV_PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| anyhow!("KV_PORT must be a port number, got {port:?}"))?;
        }
        if self.admin_password.is_empty() {
            if let Ok(pass) = std::env::var("KV_ADMIN_PASSWORD") {
                self.admin_password = pass;
            }
        }
        Ok(())
    }

    fn normalize(&mut self) {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow!("port must be in 1..=65535"));
        }
        if self.data_file.as_os_str().is_empty() {
            return Err(anyhow!("data_file must not be empty"));
        }
        if self.admin_password.is_empty() {
            return Err(anyhow!(
                "admin_password is empty; set it in the config file or KV_ADMIN_PASSWORD"
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
