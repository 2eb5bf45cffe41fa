pub mod balancer;
pub mod connector;
pub mod error;
pub mod registry;
pub mod telemetry;

pub use connector::{Connector, Handle, KafkaConnector, KafkaReader, KafkaWriter};
pub use error::Error;
pub use registry::config::{Config, ReaderConfig, WriterConfig};
pub use registry::Registry;
