//! Bounded FIFO history of delta records.

use std::collections::VecDeque;

use crate::record::DeltaRecord;

/// One hour of history at one poll every 30 seconds.
pub const DEFAULT_HISTORY_CAPACITY: usize = 120;

/// Insertion-ordered history; the oldest record is evicted when full.
#[derive(Debug, Clone)]
pub struct UpdateBuffer {
    records: VecDeque<DeltaRecord>,
    capacity: usize,
}

impl Default for UpdateBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl UpdateBuffer {
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "update buffer capacity must be at least 1");
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `record`, returning the evicted oldest record if the buffer was full.
    pub fn push(&mut self, record: DeltaRecord) -> Option<DeltaRecord> {
        let evicted = if self.records.len() >= self.capacity {
            self.records.pop_front()
        } else {
            None
        };
        self.records.push_back(record);
        assert!(
            self.records.len() <= self.capacity,
            "update buffer holds {} records, capacity {}",
            self.records.len(),
            self.capacity
        );
        evicted
    }

    /// Remove and return every record, oldest first.
    pub fn take_all(&mut self) -> Vec<DeltaRecord> {
        self.records.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeltaRecord> {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::DeltaMap;
    use crate::record::empty_blob;

    fn record(utc: f64) -> DeltaRecord {
        DeltaRecord {
            ok: true,
            running: true,
            state: None,
            state_reason: None,
            stats: DeltaMap::new(),
            period: 30.0,
            tunnel_stats: empty_blob(),
            utc,
        }
    }

    #[test]
    fn test_len_tracks_pushes_below_capacity() {
        let mut buf = UpdateBuffer::default();
        for n in 1..DEFAULT_HISTORY_CAPACITY {
            assert!(buf.push(record(n as f64)).is_none());
            assert_eq!(buf.len(), n);
        }
    }

    #[test]
    fn test_fifo_eviction_keeps_most_recent() {
        let mut buf = UpdateBuffer::default();
        let total = DEFAULT_HISTORY_CAPACITY + 37;
        let mut evicted = Vec::new();
        for n in 0..total {
            if let Some(old) = buf.push(record(n as f64)) {
                evicted.push(old.utc);
            }
        }
        assert_eq!(buf.len(), DEFAULT_HISTORY_CAPACITY);
        let kept: Vec<f64> = buf.iter().map(|r| r.utc).collect();
        let expected: Vec<f64> = (total - DEFAULT_HISTORY_CAPACITY..total)
            .map(|n| n as f64)
            .collect();
        assert_eq!(kept, expected);
        assert_eq!(evicted, (0..37).map(|n| n as f64).collect::<Vec<_>>());
    }

    #[test]
    fn test_take_all_empties() {
        let mut buf = UpdateBuffer::with_capacity(3);
        buf.push(record(1.0));
        buf.push(record(2.0));
        let out = buf.take_all();
        assert_eq!(out.iter().map(|r| r.utc).collect::<Vec<_>>(), vec![1.0, 2.0]);
        assert!(buf.is_empty());
        assert!(buf.take_all().is_empty());
    }

    #[test]
    fn test_capacity_one() {
        let mut buf = UpdateBuffer::with_capacity(1);
        buf.push(record(1.0));
        let old = buf.push(record(2.0)).unwrap();
        assert_eq!(old.utc, 1.0);
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.capacity(), 1);
    }

    #[test]
    #[should_panic(expected = "capacity must be at least 1")]
    fn test_zero_capacity_panics() {
        let _ = UpdateBuffer::with_capacity(0);
    }
}
