use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

// Realtime layer constants — fixed by design, not configurable.
pub const DEFAULT_PORT: u16 = 18620;
pub const DEFAULT_BIND: &str = "127.0.0.1";
/// A heartbeat older than this counts as offline (strict: equality is offline).
pub const PRESENCE_THRESHOLD_MS: i64 = 30_000;
/// Soft cap on bus listeners per event type — exceeded means a probable leak.
pub const LISTENER_SOFT_CAP: usize = 100;
/// Per-connection frame buffer. A full buffer is treated as a dead transport.
pub const SINK_BUFFER: usize = 64;

/// Top-level config (mentora.toml + MENTORA_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentoraConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for MentoraConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl MentoraConfig {
    /// Load config from a TOML file with MENTORA_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.mentora/mentora.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: MentoraConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("MENTORA_").split("_"))
            .extract()
            .map_err(|e| crate::error::ConfigError::Load(e.to_string()))?;

        Ok(config)
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.mentora/mentora.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_loopback() {
        let config = MentoraConfig::default();
        assert_eq!(config.gateway.bind, "127.0.0.1");
        assert_eq!(config.gateway.port, DEFAULT_PORT);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = MentoraConfig::load(Some("/nonexistent/mentora.toml")).unwrap();
        assert_eq!(config.gateway.port, DEFAULT_PORT);
    }
}
