//! Server configuration, layered from an optional `procura.toml` and
//! `PROCURA__*` environment variables.

use std::path::Path;

use config::{Config, Environment, File};
use procura_db::DbConfig;
use procura_workflow::WorkflowConfig;
use serde::Deserialize;

const CONFIG_FILE: &str = "procura";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub database: DbConfig,
    pub workflow: WorkflowConfig,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Capacity of the notification queue between the workflow and the
    /// delivery task.
    pub event_queue_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database: DbConfig::default(),
            workflow: WorkflowConfig::default(),
            log_filter: "procura=info".into(),
            event_queue_capacity: 256,
        }
    }
}

impl ServerConfig {
    /// Load configuration with precedence, lowest first:
    /// 1. Default values
    /// 2. `procura.toml` in the working directory, if present
    /// 3. Environment variables such as `PROCURA__DATABASE__URL`
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder();

        if Path::new(&format!("{CONFIG_FILE}.toml")).exists() {
            builder = builder.add_source(File::with_name(CONFIG_FILE));
        }

        builder = builder.add_source(
            Environment::with_prefix("PROCURA")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
