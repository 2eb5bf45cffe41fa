use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const CONFIG_RELATIVE_PATH: &str = "etc/conf/kafka.json";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    pub balancer: String,
    #[serde(rename = "async")]
    pub is_async: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    #[serde(rename = "groupID")]
    pub group_id: String,
    pub partition: i32,
    #[serde(rename = "minBytes")]
    pub min_bytes: i32,
    #[serde(rename = "maxBytes")]
    pub max_bytes: i32,
}

/// Contents of `kafka.json`: the broker list and what to open per topic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub brokers: Vec<String>,
    pub writer: HashMap<String, WriterConfig>,
    pub reader: HashMap<String, ReaderConfig>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_slice(&bytes).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(bytes).map_err(|source| Error::Parse {
            path: PathBuf::new(),
            source,
        })
    }

    /// `<prefix>/etc/conf/kafka.json`
    pub fn default_path(prefix: impl AsRef<Path>) -> PathBuf {
        prefix.as_ref().join(CONFIG_RELATIVE_PATH)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const FULL: &str = r#"{
        "brokers": ["b1:9092", "b2:9092"],
        "writer": {
            "orders": {"balancer": "HASH", "async": false},
            "clicks": {"balancer": "leastbytes", "async": true}
        },
        "reader": {
            "orders": {"groupID": "billing", "partition": 0, "minBytes": 10, "maxBytes": 1048576}
        }
    }"#;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn load_reads_every_section() {
        let f = write_config(FULL);
        let cfg = Config::load(f.path()).unwrap();

        assert_eq!(cfg.brokers, vec!["b1:9092", "b2:9092"]);

        let mut writers: Vec<_> = cfg.writer.keys().cloned().collect();
        writers.sort();
        assert_eq!(writers, vec!["clicks", "orders"]);
        assert_eq!(
            cfg.writer["clicks"],
            WriterConfig {
                balancer: "leastbytes".to_string(),
                is_async: true,
            }
        );

        assert_eq!(cfg.reader.len(), 1);
        assert_eq!(
            cfg.reader["orders"],
            ReaderConfig {
                group_id: "billing".to_string(),
                partition: 0,
                min_bytes: 10,
                max_bytes: 1048576,
            }
        );
    }

    #[test]
    fn missing_fields_take_zero_values() {
        let cfg = Config::from_slice(
            br#"{"brokers":["b:9092"],"writer":{"t":{}},"reader":{"t":{"groupID":"g"}}}"#,
        )
        .unwrap();

        assert_eq!(cfg.writer["t"], WriterConfig::default());
        assert_eq!(cfg.reader["t"].group_id, "g");
        assert_eq!(cfg.reader["t"].partition, 0);
        assert_eq!(cfg.reader["t"].min_bytes, 0);
        assert_eq!(cfg.reader["t"].max_bytes, 0);
    }

    #[test]
    fn missing_sections_are_empty() {
        let cfg = Config::from_slice(br#"{"brokers":["b:9092"]}"#).unwrap();
        assert!(cfg.writer.is_empty());
        assert!(cfg.reader.is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let cfg = Config::from_slice(
            br#"{"brokers":[],"writer":{"t":{"balancer":"hash","batchSize":10}},"extra":1}"#,
        )
        .unwrap();
        assert_eq!(cfg.writer["t"].balancer, "hash");
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let f = write_config("{\"brokers\": [");
        let err = Config::load(f.path()).unwrap_err();
        assert!(matches!(err, Error::Parse { ref path, .. } if path == f.path()));
    }

    #[test]
    fn wrong_shape_is_parse_error() {
        let err = Config::from_slice(br#"{"brokers":"b:9092"}"#).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let err = Config::load(&path).unwrap_err();
        match err {
            Error::Io { path: p, source } => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn default_path_appends_conf_location() {
        assert_eq!(
            Config::default_path("/opt/app"),
            PathBuf::from("/opt/app/etc/conf/kafka.json")
        );
    }
}
