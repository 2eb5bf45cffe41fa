use std::path::PathBuf;

use kafka_registry::{connector, telemetry};
use pepe_config::{ConfigError, FileFormat};
use serde::{Deserialize, Serialize};

fn default_prefix() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Root that `etc/conf/kafka.json` is resolved against.
    #[serde(default = "default_prefix")]
    pub prefix: PathBuf,
    /// Overrides the prefix rule when set.
    pub kafka_config: Option<PathBuf>,
    #[serde(default)]
    pub connector: connector::Config,
    pub telemetry: telemetry::Config,
}

pub const DEFAULT_CONFIG: &str = include_str!("../config.yaml");

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        pepe_config::load(DEFAULT_CONFIG, FileFormat::Yaml)
    }

    pub fn kafka_config_path(&self) -> PathBuf {
        self.kafka_config
            .clone()
            .unwrap_or_else(|| kafka_registry::Config::default_path(&self.prefix))
    }
}
