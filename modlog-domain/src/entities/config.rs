// Runtime configuration handed down from bootstrap

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub allowed_channel_ids: Vec<i64>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
}

/// Knobs injected into the ingestion pipeline.
///
/// Fuzzy username matching is carried for configuration compatibility
/// only; identity is always resolved by exact PlayFab id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    pub fuzzy_username_match: bool,
    pub fuzzy_match_threshold: u8,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            fuzzy_username_match: false,
            fuzzy_match_threshold: 92,
        }
    }
}
