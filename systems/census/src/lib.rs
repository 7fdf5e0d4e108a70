#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Census system that records population statistics and tracks cells needing a redraw.

use std::collections::{BTreeSet, VecDeque};

use log::debug;
use outbreak_core::{CellIndex, Event, PopulationStats};

/// Pure system that folds world events into a bounded statistics history.
#[derive(Debug)]
pub struct Census {
    history_len: usize,
    history: VecDeque<PopulationStats>,
    passes: u64,
    plague_deaths: f64,
    dirty: BTreeSet<CellIndex>,
}

impl Census {
    /// Creates a census that keeps at most `history_len` samples.
    #[must_use]
    pub fn new(history_len: usize) -> Self {
        Self {
            history_len,
            history: VecDeque::new(),
            passes: 0,
            plague_deaths: 0.0,
            dirty: BTreeSet::new(),
        }
    }

    /// Consumes world events, recording statistics and dirty cells.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::WorldInitialized { width, height, .. } => {
                    self.history.clear();
                    self.passes = 0;
                    self.plague_deaths = 0.0;
                    self.dirty.clear();
                    let cells = width.saturating_mul(*height);
                    self.dirty.extend((0..cells).map(CellIndex::new));
                    debug!("census reset for {width}x{height} grid");
                }
                Event::SpreadPassCompleted {
                    pass,
                    census,
                    killed,
                } => {
                    self.passes = *pass;
                    self.plague_deaths += *killed;
                    self.record(*census);
                }
                Event::CellsChanged { cells } => {
                    self.dirty.extend(cells.iter().copied());
                }
                _ => {}
            }
        }
    }

    fn record(&mut self, stats: PopulationStats) {
        if self.history_len == 0 {
            return;
        }
        while self.history.len() >= self.history_len {
            let _ = self.history.pop_front();
        }
        self.history.push_back(stats);
    }

    /// Most recent statistics sample, if any pass has completed.
    #[must_use]
    pub fn latest(&self) -> Option<&PopulationStats> {
        self.history.back()
    }

    /// Recorded samples from oldest to newest.
    pub fn history(&self) -> impl Iterator<Item = &PopulationStats> {
        self.history.iter()
    }

    /// Number of spread passes observed since initialization.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Infected population killed by the plague since initialization.
    #[must_use]
    pub fn plague_deaths(&self) -> f64 {
        self.plague_deaths
    }

    /// Number of cells awaiting a redraw.
    #[must_use]
    pub fn dirty_len(&self) -> usize {
        self.dirty.len()
    }

    /// Drains the cells awaiting a redraw in ascending index order.
    #[must_use]
    pub fn take_dirty_cells(&mut self) -> Vec<CellIndex> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }
}
