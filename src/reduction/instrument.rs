//! Per-instrument file reduction: filter, convert, restrict, average

use serde::Serialize;
use tracing::debug;

use super::averager::TemporalAverager;
use super::quality_filter::{drop_rejected, FilterResult, QualityFilter};
use crate::acquisition::{Channels, PrimaryChannels, RawFile, SecondaryChannels};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::physics_engine::{
    cartesian_to_spherical, correct_radial_velocity, ev_to_kelvin, km_to_solar_radii,
    thermal_speed_to_temperature,
};
use crate::types::{Instrument, Sample, SampleSet};

/// Sample counts at each reduction stage, for the execution log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReductionCounts {
    /// Samples in the raw file(s)
    pub raw: usize,
    /// Samples left after quality filtering and the ceiling restriction
    pub filtered: usize,
    /// Rows after temporal averaging
    pub averaged: usize,
}

impl std::ops::AddAssign for ReductionCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.raw += rhs.raw;
        self.filtered += rhs.filtered;
        self.averaged += rhs.averaged;
    }
}

/// One reduced file.
#[derive(Debug, Clone)]
pub struct Reduction {
    pub samples: SampleSet,
    pub counts: ReductionCounts,
}

/// Settings shared by both instrument reductions.
#[derive(Debug, Clone)]
pub struct InstrumentReducer<'a> {
    config: &'a PipelineConfig,
    averager: TemporalAverager,
}

impl<'a> InstrumentReducer<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self {
            config,
            averager: TemporalAverager::new(config.averaging.window_secs),
        }
    }

    /// Primary file: Cartesian position to spherical, thermal speed to
    /// temperature.
    pub fn reduce_primary(&self, file: &RawFile<PrimaryChannels>) -> Result<Reduction> {
        let ch = &file.channels;
        ch.check_lengths(&file.name)?;
        let filter = QualityFilter::primary(ch, &self.config.quality);
        log_filter(Instrument::Primary, &file.name, &filter);

        let keep = |v: &[f64]| drop_rejected(v, &filter.rejected);
        let (epoch, x, y, z) = (keep(&ch.epoch), keep(&ch.pos_x), keep(&ch.pos_y), keep(&ch.pos_z));
        let (vr, np, wp) = (keep(&ch.vr), keep(&ch.np), keep(&ch.wp));

        let samples = (0..epoch.len())
            .map(|i| {
                let pos = cartesian_to_spherical(x[i], y[i], z[i]);
                Sample {
                    epoch: epoch[i],
                    r_km: pos.r,
                    theta: Some(pos.theta),
                    phi: Some(pos.phi),
                    vr: vr[i],
                    np: np[i],
                    temp: thermal_speed_to_temperature(wp[i]),
                }
            })
            .collect();

        self.finish(Instrument::Primary, &file.name, ch.len(), samples)
    }

    /// Secondary file: spacecraft motion removed from the radial velocity,
    /// temperature from eV to kelvin. No angles are available.
    pub fn reduce_secondary(&self, file: &RawFile<SecondaryChannels>) -> Result<Reduction> {
        let ch = &file.channels;
        ch.check_lengths(&file.name)?;
        let filter = QualityFilter::secondary(ch, &self.config.quality);
        log_filter(Instrument::Secondary, &file.name, &filter);

        let keep = |v: &[f64]| drop_rejected(v, &filter.rejected);
        let (epoch, dist) = (keep(&ch.epoch), keep(&ch.sun_dist));
        let (vr, sc_vr, np, temp) = (keep(&ch.vr), keep(&ch.sc_vr), keep(&ch.np), keep(&ch.temp));

        let samples = (0..epoch.len())
            .map(|i| Sample {
                epoch: epoch[i],
                r_km: dist[i],
                theta: None,
                phi: None,
                vr: correct_radial_velocity(vr[i], sc_vr[i]),
                np: np[i],
                temp: ev_to_kelvin(temp[i]),
            })
            .collect();

        self.finish(Instrument::Secondary, &file.name, ch.len(), samples)
    }

    /// Ceiling restriction, order check and averaging.
    fn finish(
        &self,
        instrument: Instrument,
        name: &str,
        raw: usize,
        mut samples: Vec<Sample>,
    ) -> Result<Reduction> {
        let binning = &self.config.binning;
        if binning.restrict_to_ceiling {
            samples.retain(|s| km_to_solar_radii(s.r_km) <= binning.ceiling);
        }
        let filtered = samples.len();

        let ordered = SampleSet::new(instrument, name, samples)?;
        let averaged = self.averager.average(ordered.samples());
        let counts = ReductionCounts {
            raw,
            filtered,
            averaged: averaged.len(),
        };
        debug!(
            instrument = %instrument,
            file = name,
            raw = counts.raw,
            filtered = counts.filtered,
            averaged = counts.averaged,
            "Reduced file"
        );

        Ok(Reduction {
            samples: SampleSet::new(instrument, name, averaged)?,
            counts,
        })
    }
}

fn log_filter(instrument: Instrument, name: &str, filter: &FilterResult) {
    if let Some(reason) = &filter.rejection_reason {
        debug!(
            instrument = %instrument,
            file = name,
            rejected = filter.rejected.count(),
            flagged = filter.breakdown.flagged,
            fill = filter.breakdown.sentinel,
            fov = filter.breakdown.field_of_view,
            "Quality filter: {}", reason
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics_engine::constants::SOLAR_RADIUS_KM;
    use crate::error::PipelineError;

    fn primary_file(epochs: &[f64], r_rs: &[f64], vr: &[f64]) -> RawFile<PrimaryChannels> {
        let n = epochs.len();
        RawFile {
            name: "20210101".into(),
            channels: PrimaryChannels {
                epoch: epochs.to_vec(),
                flag: vec![0; n],
                pos_x: r_rs.iter().map(|r| r * SOLAR_RADIUS_KM).collect(),
                pos_y: vec![0.0; n],
                pos_z: vec![0.0; n],
                vr: vr.to_vec(),
                np: vec![50.0; n],
                wp: vec![50.0; n],
            },
        }
    }

    #[test]
    fn test_primary_reduction_counts() {
        let config = PipelineConfig::default();
        let reducer = InstrumentReducer::new(&config);
        // 20 s cadence so averaging keeps every row; one fill, one beyond ceiling
        let file = primary_file(
            &[0.0, 20.0, 40.0, 60.0],
            &[20.0, 20.1, 45.0, 20.3],
            &[300.0, -1e30, 310.0, 320.0],
        );
        let out = reducer.reduce_primary(&file).unwrap();
        assert_eq!(
            out.counts,
            ReductionCounts {
                raw: 4,
                filtered: 2,
                averaged: 2
            }
        );
        let s = out.samples.samples();
        assert!((s[0].r_rs() - 20.0).abs() < 1e-9);
        assert!((s[0].temp - 151_434.39).abs() < 0.1);
        assert!(s[0].theta.is_some());
        assert_eq!(s[1].vr, 320.0);
    }

    #[test]
    fn test_restriction_can_be_disabled() {
        let mut config = PipelineConfig::default();
        config.binning.restrict_to_ceiling = false;
        let reducer = InstrumentReducer::new(&config);
        let file = primary_file(&[0.0, 20.0], &[20.0, 45.0], &[300.0, 310.0]);
        assert_eq!(reducer.reduce_primary(&file).unwrap().counts.filtered, 2);
    }

    #[test]
    fn test_unordered_file_rejected() {
        let config = PipelineConfig::default();
        let reducer = InstrumentReducer::new(&config);
        let file = primary_file(&[20.0, 0.0], &[20.0, 20.0], &[300.0, 310.0]);
        assert!(matches!(
            reducer.reduce_primary(&file),
            Err(PipelineError::UnorderedInput { .. })
        ));
    }

    #[test]
    fn test_secondary_corrections() {
        let config = PipelineConfig::default();
        let reducer = InstrumentReducer::new(&config);
        let file = RawFile {
            name: "20210101".into(),
            channels: SecondaryChannels {
                epoch: vec![0.0, 3.0, 30.0],
                flag: vec![0, 0, 1],
                sun_dist: vec![15.0 * SOLAR_RADIUS_KM; 3],
                vr: vec![350.0, 370.0, 999.0],
                sc_vr: vec![50.0, 50.0, 50.0],
                np: vec![100.0; 3],
                temp: vec![10.0, 30.0, 10.0],
                eflux: vec![vec![0.0, 0.0, 1.0]; 3],
            },
        };
        let out = reducer.reduce_secondary(&file).unwrap();
        // Third row flagged; first two share one 10 s window
        assert_eq!(out.counts, ReductionCounts { raw: 3, filtered: 2, averaged: 1 });
        let s = out.samples.samples()[0];
        assert!((s.vr - 310.0).abs() < 1e-9);
        assert!((s.temp - 20.0 * 11_604.518).abs() < 1.0);
        assert!(s.theta.is_none());
    }
}
