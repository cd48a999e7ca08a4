//! Store-level counters (feature `metrics`).
//!
//! Every store owns a [`StoreMetricsRecorder`] and exposes a copy of its
//! counters through [`SelectorCache::metrics`](crate::traits::SelectorCache::metrics).
//! Recording is plain integer increments on `&mut self`; no atomics are
//! needed since stores are single-threaded.
//!
//! ```text
//!   get hit ──────► hits       set new key ──► inserts
//!   get miss ─────► misses     set existing ─► updates
//!   remove found ─► removes    capacity ─────► evictions
//! ```

/// Snapshot of store-level metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreMetrics {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub updates: u64,
    pub removes: u64,
    pub evictions: u64,
    pub clears: u64,
}

impl StoreMetrics {
    /// Fraction of lookups that hit, `0.0` before the first lookup.
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// Counter set owned by a store.
#[derive(Debug, Default, Clone)]
pub(crate) struct StoreMetricsRecorder {
    counters: StoreMetrics,
}

impl StoreMetricsRecorder {
    #[inline]
    pub(crate) fn record_hit(&mut self) {
        self.counters.hits += 1;
    }

    #[inline]
    pub(crate) fn record_miss(&mut self) {
        self.counters.misses += 1;
    }

    #[inline]
    pub(crate) fn record_insert(&mut self) {
        self.counters.inserts += 1;
    }

    #[inline]
    pub(crate) fn record_update(&mut self) {
        self.counters.updates += 1;
    }

    #[inline]
    pub(crate) fn record_remove(&mut self) {
        self.counters.removes += 1;
    }

    #[inline]
    pub(crate) fn record_eviction(&mut self) {
        self.counters.evictions += 1;
    }

    #[inline]
    pub(crate) fn record_clear(&mut self) {
        self.counters.clears += 1;
    }

    #[inline]
    pub(crate) fn snapshot(&self) -> StoreMetrics {
        self.counters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_ratio_handles_no_lookups() {
        assert_eq!(StoreMetrics::default().hit_ratio(), 0.0);
    }

    #[test]
    fn recorder_counts_events() {
        let mut recorder = StoreMetricsRecorder::default();
        recorder.record_hit();
        recorder.record_hit();
        recorder.record_miss();
        recorder.record_insert();
        recorder.record_eviction();

        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.hits, 2);
        assert_eq!(snapshot.misses, 1);
        assert_eq!(snapshot.inserts, 1);
        assert_eq!(snapshot.evictions, 1);
        assert!((snapshot.hit_ratio() - 2.0 / 3.0).abs() < f64::EPSILON);
    }
}
