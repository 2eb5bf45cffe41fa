use crate::error::Error;
use crate::registry::config::{ReaderConfig, WriterConfig};

pub use self::config::Config;
pub use self::reader::{KafkaReader, Message};
pub use self::writer::KafkaWriter;

mod config;
mod reader;
mod writer;

/// A broker session owned by the registry.
pub trait Handle {
    fn topic(&self) -> &str;

    /// Releases the session. Consumes the handle so it is released once.
    fn close(self) -> Result<(), Error>;
}

/// Opens writer and reader handles for a topic.
pub trait Connector {
    type Writer: Handle;
    type Reader: Handle;

    fn writer(
        &self,
        brokers: &[String],
        topic: &str,
        cfg: &WriterConfig,
    ) -> Result<Self::Writer, Error>;

    fn reader(
        &self,
        brokers: &[String],
        topic: &str,
        cfg: &ReaderConfig,
    ) -> Result<Self::Reader, Error>;
}

pub struct KafkaConnector {
    cfg: Config,
}

impl KafkaConnector {
    pub fn new(cfg: Config) -> Self {
        Self { cfg }
    }
}

impl Connector for KafkaConnector {
    type Writer = KafkaWriter;
    type Reader = KafkaReader;

    fn writer(
        &self,
        brokers: &[String],
        topic: &str,
        cfg: &WriterConfig,
    ) -> Result<KafkaWriter, Error> {
        KafkaWriter::connect(brokers, topic, cfg, &self.cfg)
    }

    fn reader(
        &self,
        brokers: &[String],
        topic: &str,
        cfg: &ReaderConfig,
    ) -> Result<KafkaReader, Error> {
        KafkaReader::connect(brokers, topic, cfg, &self.cfg)
    }
}
