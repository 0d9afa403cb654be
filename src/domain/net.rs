//! Network traffic samples and the capped history behind the net chart

use std::collections::VecDeque;

use serde::Deserialize;

/// Samples kept before the history is cut back
pub const HISTORY_HIGH_WATER: usize = 500;
/// Samples left after a cut
pub const HISTORY_LOW_WATER: usize = 300;

/// `getnettotals`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NetTotals {
    pub totalbytesrecv: u64,
    pub totalbytessent: u64,
    pub timemillis: i64,
}

/// Transfer rate over one polling interval, in bytes per second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throughput {
    pub up: f64,
    pub down: f64,
}

impl Throughput {
    pub fn total(&self) -> f64 {
        self.up + self.down
    }
}

/// Ordered snapshot history, oldest first, capped at
/// [`HISTORY_HIGH_WATER`] samples.
#[derive(Debug, Clone, Default)]
pub struct NetHistory {
    samples: VecDeque<NetTotals>,
}

impl NetHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&NetTotals> {
        self.samples.back()
    }

    pub fn push(&mut self, sample: NetTotals) {
        self.samples.push_back(sample);
        if self.samples.len() > HISTORY_HIGH_WATER {
            let excess = self.samples.len() - HISTORY_LOW_WATER;
            self.samples.drain(..excess);
        }
    }

    /// Per-interval rates between consecutive samples. Pairs without a
    /// positive time step are skipped; counter resets read as zero.
    pub fn deltas(&self) -> Vec<Throughput> {
        self.samples
            .iter()
            .zip(self.samples.iter().skip(1))
            .filter_map(|(prev, current)| {
                let seconds = (current.timemillis - prev.timemillis) as f64 / 1000.0;
                if seconds <= 0.0 {
                    return None;
                }
                let up = current.totalbytessent.saturating_sub(prev.totalbytessent);
                let down = current.totalbytesrecv.saturating_sub(prev.totalbytesrecv);
                Some(Throughput {
                    up: up as f64 / seconds,
                    down: down as f64 / seconds,
                })
            })
            .collect()
    }
}
