//! Generation counters
//!
//! Per-source attempt/outcome counters, owned by whoever runs the generation
//! service and passed in by reference.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::items::{Rarity, RollSource};

const SOURCES: usize = RollSource::ALL.len();

#[derive(Debug, Default)]
struct SourceCounters {
    attempts: AtomicU64,
    ineligible: AtomicU64,
    already_rolled: AtomicU64,
    rolled: AtomicU64,
    rolled_by_rarity: [AtomicU64; Rarity::COUNT],
}

/// Thread-safe generation counters
#[derive(Debug, Default)]
pub struct GenerationDiagnostics {
    sources: [SourceCounters; SOURCES],
}

/// Plain copy of the counters for one source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSnapshot {
    pub attempts: u64,
    pub ineligible: u64,
    pub already_rolled: u64,
    pub rolled: u64,
    pub rolled_by_rarity: BTreeMap<Rarity, u64>,
}

/// Plain copy of all counters, sources with no activity omitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsSnapshot {
    pub by_source: BTreeMap<RollSource, SourceSnapshot>,
}

impl DiagnosticsSnapshot {
    pub fn total_attempts(&self) -> u64 {
        self.by_source.values().map(|s| s.attempts).sum()
    }

    pub fn total_rolled(&self) -> u64 {
        self.by_source.values().map(|s| s.rolled).sum()
    }
}

impl GenerationDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn source(&self, source: RollSource) -> &SourceCounters {
        &self.sources[source.index()]
    }

    pub fn record_attempt(&self, source: RollSource) {
        self.source(source).attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ineligible(&self, source: RollSource) {
        self.source(source).ineligible.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_already_rolled(&self, source: RollSource) {
        self.source(source).already_rolled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rolled(&self, source: RollSource, rarity: Rarity) {
        let counters = self.source(source);
        counters.rolled.fetch_add(1, Ordering::Relaxed);
        counters.rolled_by_rarity[rarity.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        let mut by_source = BTreeMap::new();
        for source in RollSource::ALL {
            let counters = self.source(source);
            let snapshot = SourceSnapshot {
                attempts: counters.attempts.load(Ordering::Relaxed),
                ineligible: counters.ineligible.load(Ordering::Relaxed),
                already_rolled: counters.already_rolled.load(Ordering::Relaxed),
                rolled: counters.rolled.load(Ordering::Relaxed),
                rolled_by_rarity: Rarity::ALL
                    .iter()
                    .map(|r| (*r, counters.rolled_by_rarity[r.index()].load(Ordering::Relaxed)))
                    .filter(|(_, n)| *n > 0)
                    .collect(),
            };
            if snapshot != SourceSnapshot::default() {
                by_source.insert(source, snapshot);
            }
        }
        DiagnosticsSnapshot { by_source }
    }

    /// Zero every counter
    pub fn reset(&self) {
        for counters in &self.sources {
            counters.attempts.store(0, Ordering::Relaxed);
            counters.ineligible.store(0, Ordering::Relaxed);
            counters.already_rolled.store(0, Ordering::Relaxed);
            counters.rolled.store(0, Ordering::Relaxed);
            for by_rarity in &counters.rolled_by_rarity {
                by_rarity.store(0, Ordering::Relaxed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_snapshot_and_reset() {
        let diagnostics = GenerationDiagnostics::new();
        diagnostics.record_attempt(RollSource::Crafted);
        diagnostics.record_attempt(RollSource::Crafted);
        diagnostics.record_rolled(RollSource::Crafted, Rarity::Epic);
        diagnostics.record_attempt(RollSource::Fishing);
        diagnostics.record_ineligible(RollSource::Fishing);

        let snapshot = diagnostics.snapshot();
        let crafted = &snapshot.by_source[&RollSource::Crafted];
        assert_eq!(crafted.attempts, 2);
        assert_eq!(crafted.rolled_by_rarity.get(&Rarity::Epic), Some(&1));
        assert_eq!(snapshot.by_source[&RollSource::Fishing].ineligible, 1);
        assert!(!snapshot.by_source.contains_key(&RollSource::Dropped));
        assert_eq!(snapshot.total_attempts(), 3);

        diagnostics.reset();
        assert_eq!(diagnostics.snapshot(), DiagnosticsSnapshot::default());
    }

    #[test]
    fn test_concurrent_increments() {
        let diagnostics = Arc::new(GenerationDiagnostics::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let d = Arc::clone(&diagnostics);
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        d.record_attempt(RollSource::Dropped);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(diagnostics.snapshot().by_source[&RollSource::Dropped].attempts, 1000);
    }
}
