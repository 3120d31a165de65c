//! Cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Sizing of a [`ChunkedTableCache`](crate::ChunkedTableCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Rows per chunk.
    pub chunk_size: usize,

    /// Upper bound on chunks held at once.
    pub max_cached_chunks: usize,

    /// Simulated backpressure: load delay per 100,000 rows of the dataset.
    #[serde(with = "millis")]
    pub load_delay_per_100k_rows: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            max_cached_chunks: 10,
            load_delay_per_100k_rows: Duration::ZERO,
        }
    }
}

impl CacheConfig {
    /// Rows the cache can hold at most.
    pub fn capacity_rows(&self) -> usize {
        self.chunk_size.saturating_mul(self.max_cached_chunks)
    }

    /// Delay applied before loading chunks from a dataset of `total_rows`.
    pub fn load_delay(&self, total_rows: usize) -> Duration {
        if self.load_delay_per_100k_rows.is_zero() || total_rows == 0 {
            return Duration::ZERO;
        }
        let nanos = self.load_delay_per_100k_rows.as_nanos() * total_rows as u128 / 100_000;
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Clamp zero sizes up to one so chunk arithmetic stays defined.
    pub(crate) fn normalized(mut self) -> Self {
        self.chunk_size = self.chunk_size.max(1);
        self.max_cached_chunks = self.max_cached_chunks.max(1);
        self
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.max_cached_chunks, 10);
        assert_eq!(config.capacity_rows(), 10_000);
        assert_eq!(config.load_delay(1_000_000), Duration::ZERO);
    }

    #[test]
    fn test_load_delay_scales_with_rows() {
        let config = CacheConfig {
            load_delay_per_100k_rows: Duration::from_millis(50),
            ..Default::default()
        };
        assert_eq!(config.load_delay(200_000), Duration::from_millis(100));
        assert_eq!(config.load_delay(0), Duration::ZERO);
    }

    #[test]
    fn test_normalized() {
        let config = CacheConfig {
            chunk_size: 0,
            max_cached_chunks: 0,
            ..Default::default()
        }
        .normalized();
        assert_eq!(config.chunk_size, 1);
        assert_eq!(config.max_cached_chunks, 1);
    }
}
