use std::path::Path;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/canarie_service.db?mode=rwc";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub links: DocLinks,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

/// Values used to seed records that do not exist yet.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Defaults {
    #[serde(default)]
    pub info: InfoDefaults,
    #[serde(default)]
    pub stats: StatisticDefaults,
}

/// Seed for the service description record.
///
/// `release_time` is an RFC 3339 string in TOML, e.g. `"2013-03-18T00:00:00Z"`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct InfoDefaults {
    pub name: String,
    pub synopsis: String,
    pub version: String,
    pub institution: String,
    pub release_time: DateTime<Utc>,
    pub support_email: String,
    pub category: String,
    pub research_subject: String,
    /// Space separated.
    pub tags: String,
}

impl Default for InfoDefaults {
    fn default() -> Self {
        Self {
            name: "CANARIE Reference Service".into(),
            synopsis: "Reference implementation of a research service exposing the \
                       platform monitoring and information API."
                .into(),
            version: "1.0.0".into(),
            institution: "CANARIE Inc.".into(),
            release_time: DateTime::<Utc>::from_timestamp(1_363_564_800, 0).unwrap_or_default(),
            support_email: "support@canarie.ca".into(),
            category: "Other/General".into(),
            research_subject: "Multi-Disciplinary".into(),
            tags: "reference demo counter".into(),
        }
    }
}

/// Seed for the demo application's counter.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatisticDefaults {
    pub name: String,
    pub value: String,
}

impl Default for StatisticDefaults {
    fn default() -> Self {
        Self { name: "invocations".into(), value: "0".into() }
    }
}

/// Redirect targets for the documentation endpoints.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DocLinks {
    pub doc: String,
    pub release_notes: String,
    pub source: String,
    pub licence: String,
    pub provenance: String,
}

const LINK_BASE: &str = "https://github.com/canarie/research_software";

impl Default for DocLinks {
    fn default() -> Self {
        Self {
            doc: format!("{LINK_BASE}/blob/master/reference/ReferenceServiceAndPlatformDesignNote.md"),
            release_notes: format!("{LINK_BASE}/blob/master/reference/release_notes.md"),
            source: format!("{LINK_BASE}/tree/master/reference"),
            licence: format!("{LINK_BASE}/blob/master/reference/licence.md"),
            provenance: format!("{LINK_BASE}/blob/master/reference/provenance.md"),
        }
    }
}

pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `CONFIG_PATH` when it exists, otherwise build from env vars and defaults.
    /// A config file that exists but fails to parse is still an error.
    pub fn load_or_env() -> Result<Self> {
        let path = config_path();
        // no file is normal for local runs and containers configured by env
        let mut cfg = if Path::new(&path).exists() { load_from_file(&path)? } else { Self::from_env() };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Built-in defaults overridden by `SERVER_HOST`, `SERVER_PORT` and `TOKIO_WORKER_THREADS`.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
            cfg.server.worker_threads = Some(w);
        }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // server: default host, reject port 0, default worker count
        self.server.normalize()?;
        // database: fill the URL from the environment when the file leaves it out
        self.database.normalize_from_env();
        self.database.validate()?;
        // seeds must be usable before any request arrives
        self.defaults.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        // 0 would make the runtime builder panic
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    /// Fill an empty URL from `DATABASE_URL`, then from the built-in SQLite default.
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            self.url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        }
    }

    pub fn is_sqlite(&self) -> bool {
        self.url.to_lowercase().starts_with("sqlite:")
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://") || lower.starts_with("sqlite:")) {
            return Err(anyhow!("database.url must start with postgres://, postgresql:// or sqlite:"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl Defaults {
    fn validate(&self) -> Result<()> {
        if self.stats.name.trim().is_empty() {
            return Err(anyhow!("defaults.stats.name must not be empty"));
        }
        // same encoding the counter uses on disk
        if self.stats.value.parse::<u64>().is_err() {
            return Err(anyhow!("defaults.stats.value must be a non-negative integer"));
        }
        Ok(())
    }
}
