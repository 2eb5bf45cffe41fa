use std::sync::{Mutex, MutexGuard};

use kafka::consumer::{Consumer, FetchOffset, GroupOffsetStorage};
use tracing::{debug, info};

use super::{Config, Handle};
use crate::error::Error;
use crate::registry::config::ReaderConfig;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub partition: i32,
    pub offset: i64,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// How a reader attaches to its topic.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Subscription {
    /// Whole topic, partitions assigned by the group.
    Group(String),
    /// Single partition, no group.
    Partition(i32),
}

impl Subscription {
    fn of(cfg: &ReaderConfig) -> Self {
        if cfg.group_id.is_empty() {
            Subscription::Partition(cfg.partition)
        } else {
            Subscription::Group(cfg.group_id.clone())
        }
    }
}

/// Consumer bound to a single topic, either as a group member or pinned to
/// one partition when no group is configured.
pub struct KafkaReader {
    topic: String,
    group: String,
    consumer: Mutex<Consumer>,
}

impl KafkaReader {
    pub fn connect(
        brokers: &[String],
        topic: &str,
        cfg: &ReaderConfig,
        conn: &Config,
    ) -> Result<Self, Error> {
        let mut builder = Consumer::from_hosts(brokers.to_vec())
            .with_client_id(conn.client_id.clone())
            .with_fallback_offset(FetchOffset::Earliest)
            .with_fetch_min_bytes(cfg.min_bytes)
            .with_fetch_max_bytes_per_partition(cfg.max_bytes);

        if let Some(t) = conn.fetch_max_wait {
            builder = builder.with_fetch_max_wait_time(t.into());
        }

        builder = match Subscription::of(cfg) {
            Subscription::Partition(p) => builder.with_topic_partitions(topic.to_string(), &[p]),
            Subscription::Group(group) => builder
                .with_group(group)
                .with_topic(topic.to_string())
                .with_offset_storage(GroupOffsetStorage::Kafka),
        };

        let consumer = builder.create().map_err(|source| Error::Connect {
            topic: topic.to_string(),
            source,
        })?;

        info!(
            topic,
            group = cfg.group_id.as_str(),
            partition = cfg.partition,
            min_bytes = cfg.min_bytes,
            max_bytes = cfg.max_bytes,
            "reader connected"
        );

        Ok(Self {
            topic: topic.to_string(),
            group: cfg.group_id.clone(),
            consumer: Mutex::new(consumer),
        })
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Fetches the next batch and marks it consumed.
    pub fn poll(&self) -> Result<Vec<Message>, Error> {
        let mut consumer = self.lock()?;

        debug!(topic = self.topic.as_str(), "fetching messagesets");
        let mss = consumer.poll()?;

        let mut out = Vec::new();
        for ms in mss.iter() {
            let partition = ms.partition();
            out.extend(ms.messages().iter().map(|m| Message {
                partition,
                offset: m.offset,
                key: m.key.to_vec(),
                value: m.value.to_vec(),
            }));
            consumer.consume_messageset(ms)?;
        }

        Ok(out)
    }

    /// Commits consumed offsets. No-op for readers outside a group.
    pub fn commit(&self) -> Result<(), Error> {
        if self.group.is_empty() {
            return Ok(());
        }
        self.lock()?.commit_consumed()?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Consumer>, Error> {
        self.consumer
            .lock()
            .map_err(|_| Error::Poisoned(self.topic.clone()))
    }
}

impl Handle for KafkaReader {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn close(self) -> Result<(), Error> {
        debug!(topic = self.topic.as_str(), "closing reader");
        let mut consumer = self
            .consumer
            .into_inner()
            .map_err(|_| Error::Poisoned(self.topic.clone()))?;

        if !self.group.is_empty() {
            consumer.commit_consumed()?;
        }
        Ok(())
    }
}
