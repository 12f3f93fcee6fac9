use crate::assemble::AssemblyStats;
use crate::dataset::Discard;
use crate::index::Outcome;
use std::collections::BTreeMap;
use std::time::Duration;

/// Row counters for one dataset pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassStats {
    pub rows: u64,
    pub kept: u64,
    pub discarded: BTreeMap<Discard, u64>,
    pub elapsed: Duration,
}

impl PassStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: Outcome) {
        self.rows += 1;
        match outcome {
            Outcome::Kept => self.kept += 1,
            Outcome::Discarded(reason) => *self.discarded.entry(reason).or_insert(0) += 1,
        }
    }

    pub fn discarded(&self, reason: Discard) -> u64 {
        self.discarded.get(&reason).copied().unwrap_or(0)
    }

    pub fn total_discarded(&self) -> u64 {
        self.discarded.values().sum()
    }
}

/// Statistics collected during one run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExtractionStats {
    pub ratings: PassStats,
    pub episodes: PassStats,
    pub titles: PassStats,
    pub assembly: AssemblyStats,
    pub assembly_elapsed: Duration,
}

impl ExtractionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn series(&self) -> u64 {
        self.assembly.series_emitted
    }

    pub fn episodes_emitted(&self) -> u64 {
        self.assembly.episodes_emitted
    }

    pub fn series_dropped(&self) -> u64 {
        self.assembly.series_dropped
    }

    pub fn rows_read(&self) -> u64 {
        self.ratings.rows + self.episodes.rows + self.titles.rows
    }

    pub fn total_elapsed(&self) -> Duration {
        self.ratings.elapsed + self.episodes.elapsed + self.titles.elapsed + self.assembly_elapsed
    }
}
