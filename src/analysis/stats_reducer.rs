//! Statistics Reducer
//!
//! Computes mean, population standard deviation, median and quartiles of
//! every tracked quantity per distance bin, emitted as a long-format table
//! with one row per (bin, statistic) pair.
//!
//! Uses statrs for mean and standard deviation; percentiles use linear
//! interpolation between closest ranks.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use super::radial_binner::BinGroup;
use crate::config::{BinningConfig, DistanceLabel};
use crate::types::{Quantity, StatKind, TaggedSample};

/// Version of the statistics and sample-table layout.
pub const SCHEMA_VERSION: u32 = 1;

// ============================================================================
// Summary of one value series
// ============================================================================

/// Five-number summary of one series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub mean: f64,
    pub std: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
}

impl Summary {
    /// `None` for an empty series.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            mean: values.iter().mean(),
            std: values.iter().population_std_dev(),
            median: percentile_sorted(&sorted, 50.0),
            q1: percentile_sorted(&sorted, 25.0),
            q3: percentile_sorted(&sorted, 75.0),
        })
    }

    pub const fn get(&self, kind: StatKind) -> f64 {
        match kind {
            StatKind::Mean => self.mean,
            StatKind::Std => self.std,
            StatKind::Median => self.median,
            StatKind::Q1 => self.q1,
            StatKind::Q3 => self.q3,
        }
    }
}

/// Linear-interpolation percentile of an ascending slice, `p` in [0, 100].
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// Linear-interpolation percentile of an unsorted series.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(percentile_sorted(&sorted, p))
}

// ============================================================================
// Long-format table
// ============================================================================

/// One row of the statistics table: one statistic of every quantity for
/// one bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatRow {
    /// Representative bin distance (solar radii)
    pub distance: f64,
    pub vr: f64,
    pub np: f64,
    #[serde(rename = "Temp")]
    pub temp: f64,
    pub mass_loss: f64,
    pub ram_pressure: f64,
    #[serde(rename = "Type")]
    pub kind: StatKind,
}

impl StatRow {
    pub const fn value(&self, quantity: Quantity) -> f64 {
        match quantity {
            Quantity::RadialVelocity => self.vr,
            Quantity::Density => self.np,
            Quantity::Temperature => self.temp,
            Quantity::MassLoss => self.mass_loss,
            Quantity::RamPressure => self.ram_pressure,
        }
    }
}

/// Per-bin instrument counts row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinCount {
    pub bin_lo: f64,
    pub bin_hi: f64,
    pub primary: usize,
    pub secondary: usize,
}

/// The run's combined statistics artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsTable {
    pub schema_version: u32,
    pub bin_width: f64,
    pub distance_label: DistanceLabel,
    pub rows: Vec<StatRow>,
    pub counts: Vec<BinCount>,
}

impl StatisticsTable {
    /// Rows of one statistic kind in ascending distance
    pub fn rows_of(&self, kind: StatKind) -> impl Iterator<Item = &StatRow> {
        self.rows.iter().filter(move |r| r.kind == kind)
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Statistics reducer over binned samples
pub struct StatsReducer;

impl StatsReducer {
    /// Summaries of every quantity for one bin's samples.
    pub fn summarize(samples: &[TaggedSample]) -> Option<[Summary; 5]> {
        let mut out = [None; 5];
        for (slot, q) in out.iter_mut().zip(Quantity::ALL) {
            let values: Vec<f64> = samples.iter().map(|s| q.value(&s.sample)).collect();
            *slot = Summary::of(&values);
        }
        let [a, b, c, d, e] = out;
        Some([a?, b?, c?, d?, e?])
    }

    /// Long-format rows: every bin's mean, then every bin's std, and so on.
    ///
    /// Empty bins contribute no rows.
    pub fn reduce(groups: &[BinGroup], label: DistanceLabel) -> Vec<StatRow> {
        let summaries: Vec<(f64, [Summary; 5])> = groups
            .iter()
            .filter_map(|g| Some((g.bin.distance(label), Self::summarize(&g.samples)?)))
            .collect();

        StatKind::ALL
            .iter()
            .flat_map(|&kind| {
                summaries.iter().map(move |&(distance, s)| {
                    let [vr, np, temp, mass_loss, ram_pressure] = s.map(|q| q.get(kind));
                    StatRow {
                        distance,
                        vr,
                        np,
                        temp,
                        mass_loss,
                        ram_pressure,
                        kind,
                    }
                })
            })
            .collect()
    }

    /// Full statistics artifact for one run.
    pub fn table(groups: &[BinGroup], config: &BinningConfig) -> StatisticsTable {
        StatisticsTable {
            schema_version: SCHEMA_VERSION,
            bin_width: config.bin_width,
            distance_label: config.distance_label,
            rows: Self::reduce(groups, config.distance_label),
            counts: groups
                .iter()
                .map(|g| BinCount {
                    bin_lo: g.bin.lo,
                    bin_hi: g.bin.hi,
                    primary: g.counts.primary,
                    secondary: g.counts.secondary,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::radial_binner::{DistanceBin, InstrumentCounts};
    use crate::physics_engine::constants::SOLAR_RADIUS_KM;
    use crate::types::{Instrument, Sample};

    fn tagged(r_rs: f64, vr: f64, instrument: Instrument) -> TaggedSample {
        TaggedSample {
            sample: Sample {
                epoch: 0.0,
                r_km: r_rs * SOLAR_RADIUS_KM,
                theta: None,
                phi: None,
                vr,
                np: 100.0,
                temp: 1e5,
            },
            instrument,
        }
    }

    fn group(lo: f64, samples: Vec<TaggedSample>) -> BinGroup {
        BinGroup {
            bin: DistanceBin {
                index: lo as usize,
                lo,
                hi: lo + 1.0,
            },
            counts: InstrumentCounts::of(&samples),
            samples,
        }
    }

    #[test]
    fn test_reference_summary() {
        let s = Summary::of(&[10.0, 20.0, 30.0, 40.0]).unwrap();
        assert!((s.mean - 25.0).abs() < 1e-12);
        assert!((s.median - 25.0).abs() < 1e-12);
        assert!((s.std - 125f64.sqrt()).abs() < 1e-12);
        assert!((s.std - 11.180_339_887).abs() < 1e-8);
        assert!((s.q1 - 17.5).abs() < 1e-12);
        assert!((s.q3 - 32.5).abs() < 1e-12);
    }

    #[test]
    fn test_summary_order_independent() {
        let a = Summary::of(&[40.0, 10.0, 30.0, 20.0]).unwrap();
        assert!((a.q1 - 17.5).abs() < 1e-12);
        assert!(Summary::of(&[]).is_none());
        let one = Summary::of(&[7.0]).unwrap();
        assert_eq!((one.std, one.median, one.q3), (0.0, 7.0, 7.0));
    }

    #[test]
    fn test_percentile_endpoints() {
        let v = [3.0, 1.0, 2.0];
        assert_eq!(percentile(&v, 0.0), Some(1.0));
        assert_eq!(percentile(&v, 100.0), Some(3.0));
        assert_eq!(percentile(&v, 50.0), Some(2.0));
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_rows_grouped_by_kind() {
        let groups = vec![
            group(10.0, vec![tagged(10.2, 10.0, Instrument::Primary), tagged(10.4, 20.0, Instrument::Primary)]),
            group(12.0, vec![tagged(12.5, 30.0, Instrument::Secondary)]),
        ];
        let rows = StatsReducer::reduce(&groups, DistanceLabel::LeftEdge);
        assert_eq!(rows.len(), 10);
        let kinds: Vec<StatKind> = rows.iter().map(|r| r.kind).collect();
        assert_eq!(&kinds[..4], &[StatKind::Mean, StatKind::Mean, StatKind::Std, StatKind::Std]);
        assert_eq!(rows[0].distance, 10.0);
        assert_eq!(rows[0].vr, 15.0);
        assert_eq!(rows[1].distance, 12.0);
        assert_eq!(rows[2].vr, 5.0);

        let centred = StatsReducer::reduce(&groups, DistanceLabel::Centre);
        assert_eq!(centred[0].distance, 10.5);
    }

    #[test]
    fn test_derived_quantities_summarized_per_sample() {
        let g = group(20.0, vec![tagged(20.0, 300.0, Instrument::Primary)]);
        let rows = StatsReducer::reduce(&[g], DistanceLabel::LeftEdge);
        let mean = rows[0];
        assert!((mean.ram_pressure - 1.505e-8).abs() < 1e-10);
        assert!(mean.mass_loss > 1e-15 && mean.mass_loss < 1e-14);
        assert_eq!(mean.value(Quantity::RadialVelocity), 300.0);
    }

    #[test]
    fn test_row_serializes_with_type_column() {
        let row = StatRow {
            distance: 10.0,
            vr: 1.0,
            np: 2.0,
            temp: 3.0,
            mass_loss: 4.0,
            ram_pressure: 5.0,
            kind: StatKind::Q1,
        };
        let json = serde_json::to_value(row).unwrap();
        assert_eq!(json["Type"], "q1");
        assert_eq!(json["Temp"], 3.0);
        let back: StatRow = serde_json::from_value(json).unwrap();
        assert_eq!(back, row);
    }
}
