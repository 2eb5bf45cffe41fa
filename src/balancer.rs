use std::collections::HashMap;
use std::fmt;

use kafka::client::ProduceMessage;
use kafka::producer::{Partitioner, Topics};

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Partition selection strategy of a writer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Hash,
    LeastBytes,
    RoundRobin,
}

impl Strategy {
    /// Case-insensitive. Unknown and empty names fall back to round-robin.
    pub fn from_name(name: &str) -> Self {
        match name.to_uppercase().as_str() {
            "HASH" => Strategy::Hash,
            "LEASTBYTES" => Strategy::LeastBytes,
            _ => Strategy::RoundRobin,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Hash => "hash",
            Strategy::LeastBytes => "leastbytes",
            Strategy::RoundRobin => "roundrobin",
        };
        f.write_str(name)
    }
}

/// Partitioner plugged into a writer's producer. Holds the per-writer state
/// the strategy needs: a round-robin cursor and bytes sent per partition.
#[derive(Debug)]
pub struct Balancer {
    strategy: Strategy,
    cursor: usize,
    bytes_sent: HashMap<i32, u64>,
}

impl Balancer {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            cursor: 0,
            bytes_sent: HashMap::new(),
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Picks a partition for a message of `size` bytes. `available` are the
    /// partitions with a live leader, `num_all` counts every partition of
    /// the topic.
    pub fn select(
        &mut self,
        available: &[i32],
        num_all: u32,
        key: Option<&[u8]>,
        size: usize,
    ) -> Option<i32> {
        match self.strategy {
            Strategy::Hash => match key {
                Some(key) if num_all > 0 => Some(((fnv1a(key) & 0x7fff_ffff) % num_all) as i32),
                Some(_) => None,
                None => self.round_robin(available),
            },
            Strategy::LeastBytes => {
                let partition = available
                    .iter()
                    .copied()
                    .min_by_key(|p| self.bytes_sent.get(p).copied().unwrap_or(0))?;
                *self.bytes_sent.entry(partition).or_insert(0) += size as u64;
                Some(partition)
            }
            Strategy::RoundRobin => self.round_robin(available),
        }
    }

    /// Partition for a record that was produced with `preset` (negative
    /// when unassigned). `partitions` is the topic's `(available, num_all)`,
    /// `None` when the topic is unknown to the client.
    fn assign(
        &mut self,
        preset: i32,
        partitions: Option<(&[i32], u32)>,
        key: Option<&[u8]>,
        value: Option<&[u8]>,
    ) -> i32 {
        // explicitly addressed records keep their partition
        if preset >= 0 {
            return preset;
        }
        let (available, num_all) = match partitions {
            Some(p) => p,
            None => return preset,
        };
        let size = key.map_or(0, <[u8]>::len) + value.map_or(0, <[u8]>::len);

        self.select(available, num_all, key, size).unwrap_or(preset)
    }

    fn round_robin(&mut self, available: &[i32]) -> Option<i32> {
        if available.is_empty() {
            return None;
        }
        let partition = available[self.cursor % available.len()];
        self.cursor = self.cursor.wrapping_add(1);
        Some(partition)
    }
}

impl Partitioner for Balancer {
    fn partition(&mut self, topics: Topics<'_>, msg: &mut ProduceMessage<'_, '_>) {
        let partitions = topics
            .partitions(msg.topic)
            .map(|p| (p.available_ids(), p.num_all()));
        msg.partition = self.assign(msg.partition, partitions, msg.key, msg.value);
    }
}

fn fnv1a(data: &[u8]) -> u32 {
    data.iter().fold(FNV_OFFSET_BASIS, |h, b| {
        (h ^ u32::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_names_are_case_insensitive() {
        for name in ["hash", "HASH", "Hash"] {
            assert_eq!(Strategy::from_name(name), Strategy::Hash);
        }
        for name in ["leastbytes", "LeastBytes", "LEASTBYTES"] {
            assert_eq!(Strategy::from_name(name), Strategy::LeastBytes);
        }
        assert_eq!(Strategy::from_name("roundRobin"), Strategy::RoundRobin);
    }

    #[test]
    fn unknown_strategy_is_round_robin() {
        assert_eq!(Strategy::from_name(""), Strategy::RoundRobin);
        assert_eq!(Strategy::from_name("foo"), Strategy::RoundRobin);
    }

    #[test]
    fn fnv1a_matches_reference_values() {
        assert_eq!(fnv1a(b""), 0x811c_9dc5);
        assert_eq!(fnv1a(b"a"), 0xe40c_292c);
        assert_eq!(fnv1a(b"foobar"), 0xbf9c_f968);
    }

    #[test]
    fn hash_is_stable_per_key() {
        let mut b = Balancer::new(Strategy::Hash);
        let available = [0, 1, 2, 3];

        let first = b.select(&available, 4, Some(b"user-42"), 10).unwrap();
        for _ in 0..10 {
            assert_eq!(b.select(&available, 4, Some(b"user-42"), 10), Some(first));
        }
        assert_eq!(first, ((fnv1a(b"user-42") & 0x7fff_ffff) % 4) as i32);
    }

    #[test]
    fn hash_without_key_cycles() {
        let mut b = Balancer::new(Strategy::Hash);
        let got: Vec<_> = (0..4).map(|_| b.select(&[0, 1], 2, None, 1)).collect();
        assert_eq!(got, vec![Some(0), Some(1), Some(0), Some(1)]);
    }

    #[test]
    fn round_robin_cycles_available_partitions() {
        let mut b = Balancer::new(Strategy::RoundRobin);
        let got: Vec<_> = (0..5)
            .map(|_| b.select(&[3, 5, 7], 8, Some(b"k"), 1))
            .collect();
        assert_eq!(got, vec![Some(3), Some(5), Some(7), Some(3), Some(5)]);
    }

    #[test]
    fn least_bytes_picks_lightest_partition() {
        let mut b = Balancer::new(Strategy::LeastBytes);
        let available = [0, 1, 2];

        assert_eq!(b.select(&available, 3, None, 100), Some(0));
        assert_eq!(b.select(&available, 3, None, 10), Some(1));
        assert_eq!(b.select(&available, 3, None, 10), Some(2));
        // 0 has 100, 1 and 2 have 10 each
        assert_eq!(b.select(&available, 3, None, 50), Some(1));
        assert_eq!(b.select(&available, 3, None, 1), Some(2));
    }

    #[test]
    fn preset_partition_is_kept() {
        let mut b = Balancer::new(Strategy::LeastBytes);
        assert_eq!(b.assign(2, Some((&[0, 1, 2][..], 3)), None, Some(b"v")), 2);
        // nothing was accounted for the preset record
        assert_eq!(b.assign(-1, Some((&[0, 1, 2][..], 3)), None, Some(b"v")), 0);
    }

    #[test]
    fn unknown_topic_stays_unassigned() {
        let mut b = Balancer::new(Strategy::RoundRobin);
        assert_eq!(b.assign(-1, None, Some(b"k"), Some(b"v")), -1);
    }

    #[test]
    fn least_bytes_counts_key_and_value() {
        let mut b = Balancer::new(Strategy::LeastBytes);
        let parts = Some((&[0, 1][..], 2));

        // 3 + 5 bytes on 0
        assert_eq!(b.assign(-1, parts, Some(b"abc"), Some(b"12345")), 0);
        // 7 bytes on 1, still lighter than 0
        assert_eq!(b.assign(-1, parts, None, Some(b"1234567")), 1);
        assert_eq!(b.assign(-1, parts, None, Some(b"x")), 1);
        assert_eq!(b.assign(-1, parts, None, Some(b"x")), 0);
    }

    #[test]
    fn no_partitions_leaves_message_unassigned() {
        assert_eq!(Balancer::new(Strategy::RoundRobin).select(&[], 0, None, 1), None);
        assert_eq!(Balancer::new(Strategy::LeastBytes).select(&[], 0, None, 1), None);
        assert_eq!(
            Balancer::new(Strategy::Hash).select(&[], 0, Some(b"k"), 1),
            None
        );
    }
}
