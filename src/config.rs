use std::collections::HashMap;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::blueprint::BlueprintFilter;

pub const CONFIG_FILE: &str = "blueprints";
pub const ENV_PREFIX: &str = "BLUEPRINTS";

/// Process-wide settings, resolved once at startup and handed to constructors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub security: SecuritySettings,
    pub filter: BlueprintFilter,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub address: String,
    pub port: u16,
    pub cors_origin: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
            cors_origin: "http://localhost:5173".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// MongoDB connection string; without one the in-memory store is used.
    pub uri: Option<String>,
    pub name: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            uri: None,
            name: "blueprints".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    pub issuer: String,
    pub token_ttl_seconds: u64,
    /// Username to plaintext password. Hashed when the credential store is built.
    pub credentials: HashMap<String, String>,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            issuer: "blueprints-api".to_string(),
            token_ttl_seconds: 3600,
            credentials: HashMap::new(),
        }
    }
}

impl Settings {
    /// Reads `blueprints.{toml,json,...}` if present, then overlays
    /// `BLUEPRINTS__SECTION__KEY` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
    }
}
