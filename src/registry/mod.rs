use std::collections::HashMap;

use tracing::{error, info, warn};

use crate::connector::{Connector, Handle};
use crate::error::Error;

pub use self::config::Config;

pub mod config;

/// Writers and readers keyed by topic, at most one of each per topic.
///
/// Populated through `init_writers`/`init_readers` before being shared;
/// lookups only need `&self`.
pub struct Registry<C: Connector> {
    connector: C,
    writers: HashMap<String, C::Writer>,
    readers: HashMap<String, C::Reader>,
}

impl<C: Connector> Registry<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            writers: HashMap::new(),
            readers: HashMap::new(),
        }
    }

    /// Builds a registry with every writer and reader `cfg` declares.
    /// If one handle fails to open, the ones already opened are closed.
    pub fn from_config(connector: C, cfg: &Config) -> Result<Self, Error> {
        let mut registry = Self::new(connector);
        let res = registry
            .init_writers(cfg)
            .and_then(|_| registry.init_readers(cfg));

        if let Err(e) = res {
            if let Err(close_err) = registry.close_all() {
                error!("failed to release partial registry: {:?}", close_err);
            }
            return Err(e);
        }
        Ok(registry)
    }

    /// Opens a writer per configured topic. Topics that already have a
    /// writer keep it, the newly opened one is closed.
    pub fn init_writers(&mut self, cfg: &Config) -> Result<(), Error> {
        for (topic, wc) in &cfg.writer {
            let w = self.connector.writer(&cfg.brokers, topic, wc)?;
            if self.writers.contains_key(topic) {
                warn!(topic = topic.as_str(), "writer already registered, discarding");
                release(w);
                continue;
            }
            self.writers.insert(topic.clone(), w);
        }
        info!("writers registered; topics={:?}", self.writer_topics());
        Ok(())
    }

    /// Reader counterpart of `init_writers`.
    pub fn init_readers(&mut self, cfg: &Config) -> Result<(), Error> {
        for (topic, rc) in &cfg.reader {
            let r = self.connector.reader(&cfg.brokers, topic, rc)?;
            if self.readers.contains_key(topic) {
                warn!(topic = topic.as_str(), "reader already registered, discarding");
                release(r);
                continue;
            }
            self.readers.insert(topic.clone(), r);
        }
        info!("readers registered; topics={:?}", self.reader_topics());
        Ok(())
    }

    pub fn writer(&self, topic: &str) -> Option<&C::Writer> {
        self.writers.get(topic)
    }

    pub fn reader(&self, topic: &str) -> Option<&C::Reader> {
        self.readers.get(topic)
    }

    pub fn writer_topics(&self) -> Vec<&str> {
        let mut topics: Vec<_> = self.writers.keys().map(String::as_str).collect();
        topics.sort_unstable();
        topics
    }

    pub fn reader_topics(&self) -> Vec<&str> {
        let mut topics: Vec<_> = self.readers.keys().map(String::as_str).collect();
        topics.sort_unstable();
        topics
    }

    /// Closes every handle. A failing close doesn't stop the rest; the
    /// topics that failed are reported once all handles were attempted.
    /// The registry is empty afterwards, so calling it again is a no-op.
    pub fn close_all(&mut self) -> Result<(), Error> {
        let mut failed = Vec::new();

        for (topic, w) in self.writers.drain() {
            if !release(w) {
                failed.push(topic);
            }
        }
        for (topic, r) in self.readers.drain() {
            if !release(r) {
                failed.push(topic);
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(Error::Close(failed))
        }
    }
}

fn release<H: Handle>(h: H) -> bool {
    let topic = h.topic().to_string();
    match h.close() {
        Ok(()) => true,
        Err(e) => {
            error!("failed to close handle; topic={}, err={:?}", topic, e);
            false
        }
    }
}
