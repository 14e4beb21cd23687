//! Data Quality Filter
//!
//! Finds the sample indices to discard before any unit conversion.
//! Independent policies each produce a [`RejectSet`]; the union is then
//! removed from every channel with [`drop_rejected`].
//!
//! Rejects:
//! - Flagged samples (primary: any non-zero flag; secondary: any configured
//!   bad bit set in the 16-bit field)
//! - Fill values at or below the sentinel threshold, and non-finite values
//! - Secondary samples whose angular flux peaks at or below the field-of-view
//!   threshold bin

use crate::acquisition::{Channels, PrimaryChannels, SecondaryChannels};
use crate::config::QualityConfig;

// ============================================================================
// Reject Set
// ============================================================================

/// Indices of samples to discard, as a mask over one file's samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectSet {
    mask: Vec<bool>,
}

impl RejectSet {
    /// Nothing rejected out of `len` samples
    pub fn none(len: usize) -> Self {
        Self {
            mask: vec![false; len],
        }
    }

    fn from_predicate<T>(values: &[T], reject: impl Fn(&T) -> bool) -> Self {
        Self {
            mask: values.iter().map(reject).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.mask.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.mask.get(index).copied().unwrap_or(false)
    }

    /// Number of rejected samples
    pub fn count(&self) -> usize {
        self.mask.iter().filter(|&&r| r).count()
    }

    /// Rejected indices in ascending order
    pub fn indices(&self) -> Vec<usize> {
        self.mask
            .iter()
            .enumerate()
            .filter_map(|(i, &r)| r.then_some(i))
            .collect()
    }

    /// Union with another set over the same samples.
    ///
    /// A shorter set is treated as rejecting nothing past its end.
    pub fn union(&mut self, other: &Self) {
        if other.mask.len() > self.mask.len() {
            self.mask.resize(other.mask.len(), false);
        }
        for (mine, &theirs) in self.mask.iter_mut().zip(&other.mask) {
            *mine |= theirs;
        }
    }
}

/// Keep the values whose index is not rejected, preserving order.
pub fn drop_rejected<T: Clone>(values: &[T], rejected: &RejectSet) -> Vec<T> {
    values
        .iter()
        .enumerate()
        .filter(|(i, _)| !rejected.contains(*i))
        .map(|(_, v)| v.clone())
        .collect()
}

// ============================================================================
// Policies
// ============================================================================

/// Reject every sample with a non-zero flag.
pub fn flag_nonzero(flags: &[i64]) -> RejectSet {
    RejectSet::from_predicate(flags, |&f| f != 0)
}

/// Reject samples with any of `bad_bits` set.
///
/// Bit 0 is the least significant bit of the flag field.
pub fn flag_bad_bits(flags: &[i64], bad_bits: &[u8]) -> RejectSet {
    let mask = bad_bits
        .iter()
        .filter(|&&b| b < 64)
        .fold(0i64, |m, &b| m | (1i64 << b));
    RejectSet::from_predicate(flags, |&f| f & mask != 0)
}

/// Reject fill values at or below `threshold`, and NaN or infinite values.
pub fn sentinel(channel: &[f64], threshold: f64) -> RejectSet {
    RejectSet::from_predicate(channel, |&v| !v.is_finite() || v <= threshold)
}

/// Index of the largest finite value, first one on ties.
pub fn array_peak(row: &[f64]) -> Option<usize> {
    row.iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, bv)) if bv >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

/// Reject samples whose flux peak bin index is at or below `threshold_index`.
///
/// A sample without any finite flux cannot be shown to be inside the field
/// of view and is rejected. With no flux bins at all the policy is skipped.
pub fn field_of_view(eflux: &[Vec<f64>], threshold_index: usize) -> RejectSet {
    RejectSet::from_predicate(eflux, |row| {
        if row.is_empty() {
            return false;
        }
        array_peak(row).map_or(true, |peak| peak <= threshold_index)
    })
}

// ============================================================================
// Per-Instrument Filter
// ============================================================================

/// Per-policy rejection counts for one file. A sample failing several
/// policies is counted under each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RejectionBreakdown {
    pub flagged: usize,
    pub sentinel: usize,
    pub field_of_view: usize,
}

/// Result of quality filtering
#[derive(Debug, Clone)]
pub struct FilterResult {
    /// Union of all policies
    pub rejected: RejectSet,
    pub breakdown: RejectionBreakdown,
    /// Primary reason for rejections (if any)
    pub rejection_reason: Option<String>,
}

impl FilterResult {
    fn from_policies(len: usize, flagged: RejectSet, sentinel: RejectSet, fov: RejectSet) -> Self {
        let breakdown = RejectionBreakdown {
            flagged: flagged.count(),
            sentinel: sentinel.count(),
            field_of_view: fov.count(),
        };

        let mut rejected = RejectSet::none(len);
        rejected.union(&flagged);
        rejected.union(&sentinel);
        rejected.union(&fov);

        let rejection_reason = [
            (breakdown.flagged, RejectionReason::Flagged),
            (breakdown.sentinel, RejectionReason::FillValue),
            (breakdown.field_of_view, RejectionReason::OutsideFieldOfView),
        ]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .max_by_key(|(count, _)| *count)
        .map(|(count, reason)| format!("{} ({} samples)", reason.describe(), count));

        Self {
            rejected,
            breakdown,
            rejection_reason,
        }
    }

    pub fn accepted(&self) -> usize {
        self.rejected.len() - self.rejected.count()
    }
}

/// Data quality filter for raw instrument files
pub struct QualityFilter;

impl QualityFilter {
    /// Primary instrument: flag ≠ 0, plus fill values in vr, np, wp.
    pub fn primary(channels: &PrimaryChannels, config: &QualityConfig) -> FilterResult {
        let mut fill = sentinel(&channels.vr, config.sentinel);
        fill.union(&sentinel(&channels.np, config.sentinel));
        fill.union(&sentinel(&channels.wp, config.sentinel));

        FilterResult::from_policies(
            channels.len(),
            flag_nonzero(&channels.flag),
            fill,
            RejectSet::none(channels.len()),
        )
    }

    /// Secondary instrument: bad flag bits, fill values in vr, sc_vr, np,
    /// temp, and field-of-view rejection.
    pub fn secondary(channels: &SecondaryChannels, config: &QualityConfig) -> FilterResult {
        let mut fill = sentinel(&channels.vr, config.sentinel);
        fill.union(&sentinel(&channels.sc_vr, config.sentinel));
        fill.union(&sentinel(&channels.np, config.sentinel));
        fill.union(&sentinel(&channels.temp, config.sentinel));

        FilterResult::from_policies(
            channels.len(),
            flag_bad_bits(&channels.flag, &config.secondary_bad_bits),
            fill,
            field_of_view(&channels.eflux, config.fov_threshold_index),
        )
    }
}

/// Reasons for sample rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RejectionReason {
    Flagged,
    FillValue,
    OutsideFieldOfView,
}

impl RejectionReason {
    const fn describe(self) -> &'static str {
        match self {
            Self::Flagged => "quality flag set",
            Self::FillValue => "fill value",
            Self::OutsideFieldOfView => "flux peak outside field of view",
        }
    }
}
