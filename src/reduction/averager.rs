//! Temporal averaging over fixed-length windows
//!
//! A window opens at the first unconsumed sample and takes every following
//! sample whose timestamp is less than `window_secs` after the opening one.
//! The window's rows collapse into their column means. The trailing partial
//! window is kept, so no sample is lost.

use std::ops::Range;

use crate::types::Sample;

/// Collapses time-ordered samples into window means.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalAverager {
    window_secs: f64,
}

impl TemporalAverager {
    pub const fn new(window_secs: f64) -> Self {
        Self { window_secs }
    }

    pub const fn window_secs(&self) -> f64 {
        self.window_secs
    }

    /// Index ranges of consecutive windows over `epochs`.
    ///
    /// Every range is non-empty, the ranges tile `0..epochs.len()`, and the
    /// timestamps inside one range span strictly less than the window. A
    /// non-positive window degenerates to one sample per range.
    pub fn windows(&self, epochs: &[f64]) -> Vec<Range<usize>> {
        let n = epochs.len();
        let mut ranges = Vec::new();
        let mut start = 0;
        while start < n {
            let mut end = start + 1;
            while end < n && epochs[end] - epochs[start] < self.window_secs {
                end += 1;
            }
            ranges.push(start..end);
            start = end;
        }
        ranges
    }

    /// Average time-ordered samples window by window.
    pub fn average(&self, samples: &[Sample]) -> Vec<Sample> {
        let epochs: Vec<f64> = samples.iter().map(|s| s.epoch).collect();
        self.windows(&epochs)
            .into_iter()
            .filter_map(|range| Sample::mean_of(&samples[range]))
            .collect()
    }
}
