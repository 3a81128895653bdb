//! Daemon configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional file
//! (`config/keyq.{toml,yaml,json}` or the path in `KEYQ_CONFIG`), then `KEYQ_*`
//! environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "config/keyq";
const ENV_PREFIX: &str = "KEYQ";

/// Storage backend behind the queue store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Service name used in logs and telemetry
    pub name: String,
    pub host: String,
    pub port: u16,
    pub backend: Backend,
    pub database_url: String,
    pub log_format: LogFormat,
}

impl DaemonConfig {
    /// Load from the default file location and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var("KEYQ_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::build(&file, Environment::with_prefix(ENV_PREFIX))
    }

    fn build(file: &str, env: Environment) -> Result<Self, ConfigError> {
        let mut config: DaemonConfig = Config::builder()
            .set_default("name", "keyq")?
            .set_default("host", "127.0.0.1")?
            .set_default("port", 9527_i64)?
            .set_default("backend", "sqlite")?
            .set_default("database_url", "~/.keyq/broker.db")?
            .set_default("log_format", "pretty")?
            .add_source(File::with_name(file).required(false))
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.database_url = shellexpand::tilde(&config.database_url).into_owned();
        Ok(config)
    }
}
