use std::sync::{Mutex, MutexGuard};

use kafka::producer::{Producer, Record, RequiredAcks};
use tracing::{debug, info};

use super::{Config, Handle};
use crate::balancer::{Balancer, Strategy};
use crate::error::Error;
use crate::registry::config::WriterConfig;

/// Producer bound to a single topic.
pub struct KafkaWriter {
    topic: String,
    is_async: bool,
    strategy: Strategy,
    producer: Mutex<Producer<Balancer>>,
}

impl KafkaWriter {
    pub fn connect(
        brokers: &[String],
        topic: &str,
        cfg: &WriterConfig,
        conn: &Config,
    ) -> Result<Self, Error> {
        let strategy = Strategy::from_name(&cfg.balancer);
        let producer = Producer::from_hosts(brokers.to_vec())
            .with_client_id(conn.client_id.clone())
            .with_ack_timeout(conn.ack_timeout.into())
            .with_required_acks(required_acks(cfg.is_async))
            .with_partitioner(Balancer::new(strategy))
            .create()
            .map_err(|source| Error::Connect {
                topic: topic.to_string(),
                source,
            })?;

        info!(
            topic,
            balancer = %strategy,
            is_async = cfg.is_async,
            "writer connected"
        );

        Ok(Self {
            topic: topic.to_string(),
            is_async: cfg.is_async,
            strategy,
            producer: Mutex::new(producer),
        })
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }

    pub fn balancer(&self) -> Strategy {
        self.strategy
    }

    /// Publishes one record to the bound topic. Sync writers return once the
    /// broker acknowledged the record.
    pub fn send(&self, key: Option<&[u8]>, value: &[u8]) -> Result<(), Error> {
        let mut producer = self.lock()?;
        match key {
            Some(key) => producer.send(&Record::from_key_value(&self.topic, key, value))?,
            None => producer.send(&Record::from_value(&self.topic, value))?,
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Producer<Balancer>>, Error> {
        self.producer
            .lock()
            .map_err(|_| Error::Poisoned(self.topic.clone()))
    }
}

// async writers don't wait for the broker to acknowledge
fn required_acks(is_async: bool) -> RequiredAcks {
    if is_async {
        RequiredAcks::None
    } else {
        RequiredAcks::One
    }
}

impl Handle for KafkaWriter {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn close(self) -> Result<(), Error> {
        debug!(topic = self.topic.as_str(), "closing writer");
        // connections are released when the producer is dropped
        drop(self.producer);
        Ok(())
    }
}
