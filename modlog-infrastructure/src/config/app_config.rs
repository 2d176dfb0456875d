use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use modlog_domain::{DbConfig, IngestConfig, RuntimeConfig};

const SQLITE_SCHEME: &str = "sqlite://";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub database_url: String,
    pub max_connections: u32,
    pub allowed_channel_ids: Vec<i64>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub enable_fuzzy_username_match: bool,
    pub fuzzy_match_threshold: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3250".to_string(),
            api_token: None,
            database_url: "sqlite://modlog.db".to_string(),
            max_connections: 5,
            allowed_channel_ids: Vec::new(),
            max_body_bytes: 4 * 1024 * 1024,
            request_timeout_seconds: 15,
            enable_fuzzy_username_match: false,
            fuzzy_match_threshold: 92,
        }
    }
}

impl AppConfig {
    pub async fn load(path_override: Option<&Path>) -> Result<Self> {
        let path = match path_override {
            Some(path) => path.to_string_lossy().to_string(),
            None => env::var("MODLOG_CONFIG").unwrap_or_else(|_| "./config.toml".to_string()),
        };
        let file_path = Path::new(&path);
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            toml::from_str::<AppConfig>(&content)
                .map_err(|err| anyhow!("invalid config {}: {}", file_path.display(), err))?
        } else {
            warn!("{} not found, using defaults", file_path.display());
            AppConfig::default()
        };
        config.apply_overrides(|key| env::var(key).ok());
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        if let Some(api_token) = &self.api_token {
            if api_token.trim().is_empty() {
                self.api_token = None;
            }
        }
        self.database_url = self.database_url.trim().to_string();
        let mut seen = Vec::with_capacity(self.allowed_channel_ids.len());
        for id in std::mem::take(&mut self.allowed_channel_ids) {
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        self.allowed_channel_ids = seen;
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.database_url = resolve_sqlite_url(base, &self.database_url);
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.database_url.is_empty() {
            return Err(anyhow!("database_url must not be empty"));
        }
        if !self.database_url.starts_with("sqlite:") {
            return Err(anyhow!(
                "database_url must use the sqlite scheme, got '{}'",
                self.database_url
            ));
        }
        if self.max_connections == 0 {
            return Err(anyhow!("max_connections must be greater than 0"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }
        if self.fuzzy_match_threshold > 100 {
            return Err(anyhow!("fuzzy_match_threshold must be within 0..=100"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            allowed_channel_ids: self.allowed_channel_ids.clone(),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            database_url: self.database_url.clone(),
            max_connections: self.max_connections,
        }
    }

    pub fn to_ingest_config(&self) -> IngestConfig {
        IngestConfig {
            fuzzy_username_match: self.enable_fuzzy_username_match,
            fuzzy_match_threshold: self.fuzzy_match_threshold,
        }
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("MODLOG_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Some(value) = lookup("MODLOG_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Some(value) = lookup("MODLOG_DATABASE_URL") {
            self.database_url = value;
        }
        if let Some(value) = lookup("MODLOG_MAX_CONNECTIONS") {
            self.max_connections = value.parse().unwrap_or(self.max_connections);
        }
        if let Some(value) = lookup("MODLOG_ALLOWED_CHANNEL_IDS") {
            self.allowed_channel_ids = parse_channel_id_list(&value);
        }
        if let Some(value) = lookup("MODLOG_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Some(value) = lookup("MODLOG_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Some(value) = lookup("MODLOG_ENABLE_FUZZY_USERNAME_MATCH") {
            self.enable_fuzzy_username_match =
                parse_flag(&value).unwrap_or(self.enable_fuzzy_username_match);
        }
        if let Some(value) = lookup("MODLOG_FUZZY_MATCH_THRESHOLD") {
            self.fuzzy_match_threshold = value.trim().parse().unwrap_or(self.fuzzy_match_threshold);
        }
    }
}

/// Rebases a relative `sqlite://` file path onto the config directory.
fn resolve_sqlite_url(base: &Path, url: &str) -> String {
    let Some(rest) = url.strip_prefix(SQLITE_SCHEME) else {
        return url.to_string();
    };
    let (file, query) = match rest.split_once('?') {
        Some((file, query)) => (file, Some(query)),
        None => (rest, None),
    };
    if file.is_empty() || file.starts_with(':') || Path::new(file).is_absolute() {
        return url.to_string();
    }
    let resolved = base.join(file).to_string_lossy().to_string();
    match query {
        Some(query) => format!("{SQLITE_SCHEME}{resolved}?{query}"),
        None => format!("{SQLITE_SCHEME}{resolved}"),
    }
}

/// Comma separated channel ids; entries that are not plain digits are dropped.
fn parse_channel_id_list(value: &str) -> Vec<i64> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty() && item.chars().all(|ch| ch.is_ascii_digit()))
        .filter_map(|item| item.parse().ok())
        .collect()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
