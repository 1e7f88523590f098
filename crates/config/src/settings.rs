//! Process bootstrap configuration — ports, upstream URLs, auth.
//!
//! Distinct from the admin-DB-backed dynamic configuration served by
//! `ConfigLoader`: this is read once at startup from a file and the
//! `ASSISTANT__` environment prefix, the way the teacher's
//! `voice_agent_config::Settings` loads server/agent config.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_enabled: bool,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub enabled: bool,
    pub api_key: Option<String>,
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

fn default_public_paths() -> Vec<String> {
    vec!["/health".to_string(), "/metrics".to_string()]
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: false,
            cors_origins: Vec::new(),
            auth: AuthConfig::default(),
        }
    }
}

/// Where the dynamic admin configuration lives (spec §4.1, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminApiConfig {
    #[serde(default = "default_admin_base_url")]
    pub base_url: String,
    pub api_token: Option<String>,
    #[serde(default = "default_config_cache_ttl")]
    pub cache_ttl_seconds: u64,
}

fn default_admin_base_url() -> String {
    "http://localhost:9000".to_string()
}

fn default_config_cache_ttl() -> u64 {
    300
}

impl Default for AdminApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_admin_base_url(),
            api_token: None,
            cache_ttl_seconds: default_config_cache_ttl(),
        }
    }
}

/// External collaborator endpoints (spec §6 Egress contracts). These are
/// opaque HTTP base URLs; the concrete STT/intent/TTS model and third-party
/// data-source choices are deployment configuration, not compiled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_stt_url")]
    pub stt_url: String,
    #[serde(default = "default_tts_url")]
    pub tts_url: String,
    #[serde(default = "default_control_plane_url")]
    pub control_plane_url: String,
    #[serde(default)]
    pub external_kv_url: Option<String>,
    #[serde(default)]
    pub disk_spill_path: Option<String>,
    #[serde(default)]
    pub fact_provider: FactProviderConfig,
}

fn default_stt_url() -> String {
    "http://localhost:9100".to_string()
}
fn default_tts_url() -> String {
    "http://localhost:9200".to_string()
}
fn default_control_plane_url() -> String {
    "http://localhost:9300".to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            stt_url: default_stt_url(),
            tts_url: default_tts_url(),
            control_plane_url: default_control_plane_url(),
            external_kv_url: None,
            disk_spill_path: None,
            fact_provider: FactProviderConfig::default(),
        }
    }
}

/// The generic fact-provider HTTP contract behind every ground-truth
/// handler (spec §4.4, SPEC_FULL open question 3): one configurable base
/// URL and API key, with the handler category carried in the request path
/// rather than baked into the client as a hardcoded vendor integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactProviderConfig {
    #[serde(default = "default_fact_provider_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_fact_provider_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_fact_provider_daily_budget")]
    pub daily_budget: u32,
}

fn default_fact_provider_base_url() -> String {
    "http://localhost:9400".to_string()
}
fn default_fact_provider_timeout_seconds() -> u64 {
    5
}
fn default_fact_provider_daily_budget() -> u32 {
    10_000
}

impl Default for FactProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_fact_provider_base_url(),
            api_key: None,
            timeout_seconds: default_fact_provider_timeout_seconds(),
            daily_budget: default_fact_provider_daily_budget(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub admin_api: AdminApiConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// Layered load: documented defaults, then an optional `config.toml`, then
/// `ASSISTANT__`-prefixed environment overrides (e.g.
/// `ASSISTANT__SERVER__PORT=9090`), mirroring the teacher's `load_settings`.
pub fn load_settings(config_path: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = config::Config::builder()
        .add_source(config::Config::try_from(&Settings::default()).map_err(|e| ConfigError::Settings(e.to_string()))?);

    if let Some(path) = config_path {
        builder = builder.add_source(config::File::with_name(path).required(false));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("ASSISTANT")
            .separator("__")
            .try_parsing(true),
    );

    builder
        .build()
        .map_err(|e| ConfigError::Settings(e.to_string()))?
        .try_deserialize()
        .map_err(|e| ConfigError::Settings(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_a_file() {
        let settings = load_settings(None).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.admin_api.cache_ttl_seconds, 300);
    }
}
