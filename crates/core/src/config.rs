use serde::{Deserialize, Serialize};

fn default_schema_version() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3665,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigIntervals {
    pub source_poll_ms: u64,
    pub liveliness_ms: u64,
}

impl Default for ConfigIntervals {
    fn default() -> Self {
        Self {
            source_poll_ms: 1_000,
            liveliness_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub server: ServerConfig,
    pub source_priority: Vec<String>,
    pub intervals: ConfigIntervals,
    pub cover_size: u32,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            server: ServerConfig::default(),
            source_priority: vec!["mpris".to_string(), "windows".to_string()],
            intervals: ConfigIntervals::default(),
            cover_size: 1280,
            log_level: "info".to_string(),
        }
    }
}
