//! Named event counters.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// A fixed set of named counters. Updates and reads never lock.
///
/// Names are declared up front; the set is small, so lookups scan it.
pub struct StatsCounter {
    slots: Vec<(&'static str, AtomicU64)>,
}

impl StatsCounter {
    pub fn new(names: &[&'static str]) -> Self {
        let mut slots: Vec<(&'static str, AtomicU64)> = Vec::with_capacity(names.len());
        for &name in names {
            if !slots.iter().any(|(n, _)| *n == name) {
                slots.push((name, AtomicU64::new(0)));
            }
        }
        Self { slots }
    }

    fn slot(&self, name: &str) -> Option<&AtomicU64> {
        self.slots.iter().find(|(n, _)| *n == name).map(|(_, c)| c)
    }

    /// Bump `name` by one. Undeclared names are ignored.
    pub fn increment(&self, name: &str) {
        self.add(name, 1);
    }

    pub fn add(&self, name: &str, value: u64) {
        if let Some(counter) = self.slot(name) {
            counter.fetch_add(value, Ordering::Relaxed);
        }
    }

    pub fn get(&self, name: &str) -> u64 {
        self.slot(name).map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// Every counter, sorted by name.
    pub fn snapshot(&self) -> BTreeMap<&'static str, u64> {
        self.slots
            .iter()
            .map(|(name, c)| (*name, c.load(Ordering::Relaxed)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_declared_names_only() {
        let stats = StatsCounter::new(&["reveals", "commits", "commits"]);
        stats.increment("commits");
        stats.add("commits", 2);
        stats.increment("unknown");
        assert_eq!(stats.get("commits"), 3);
        assert_eq!(stats.get("reveals"), 0);
        assert_eq!(stats.get("unknown"), 0);

        let snap = stats.snapshot();
        assert_eq!(snap.keys().copied().collect::<Vec<_>>(), vec!["commits", "reveals"]);
    }
}
