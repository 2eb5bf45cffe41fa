use std::time::Duration;

use pepe_config::DurationString;
use serde::{Deserialize, Serialize};

fn default_client_id() -> String {
    "kafka-registry".to_string()
}

fn default_ack_timeout() -> DurationString {
    DurationString::from(Duration::from_secs(1))
}

/// Settings shared by every handle the connector opens.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_ack_timeout")]
    pub ack_timeout: DurationString,
    pub fetch_max_wait: Option<DurationString>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            ack_timeout: default_ack_timeout(),
            fetch_max_wait: None,
        }
    }
}
