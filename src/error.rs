use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("can't read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("can't parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("can't connect handle for topic '{topic}': {source}")]
    Connect {
        topic: String,
        #[source]
        source: kafka::Error,
    },

    #[error(transparent)]
    Kafka(#[from] kafka::Error),

    #[error("handle for topic '{0}' is poisoned")]
    Poisoned(String),

    #[error("failed to close handles for topics {0:?}")]
    Close(Vec<String>),
}
