//! Samples, ordered sample sets and encounter collections

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::physics_engine::km_to_solar_radii;

// ============================================================================
// Instrument
// ============================================================================

/// Which of the two plasma instruments produced a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    /// Faraday-cup type instrument: Cartesian position, thermal speed, general flag
    Primary,
    /// Electrostatic analyser: distance, temperature in eV, bit-field flag, angular flux
    Secondary,
}

impl Instrument {
    pub const ALL: [Self; 2] = [Self::Primary, Self::Secondary];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Sample
// ============================================================================

/// One reduced instrument measurement.
///
/// Only produced after quality filtering, so every field is physically
/// valid. Angles are `None` for instruments that report distance only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds (monotonic within a file)
    pub epoch: f64,
    /// Heliocentric distance (km)
    pub r_km: f64,
    /// Inclination (radians)
    pub theta: Option<f64>,
    /// Azimuth (radians)
    pub phi: Option<f64>,
    /// Radial velocity (km/s)
    pub vr: f64,
    /// Proton density (cm⁻³)
    pub np: f64,
    /// Proton temperature (K)
    pub temp: f64,
}

impl Sample {
    /// Heliocentric distance in solar radii
    pub fn r_rs(&self) -> f64 {
        km_to_solar_radii(self.r_km)
    }

    /// Arithmetic mean of every numeric column.
    ///
    /// Angles stay defined only if every sample carries them. Returns
    /// `None` for an empty slice.
    pub fn mean_of(samples: &[Self]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let n = samples.len() as f64;
        let avg = |f: fn(&Self) -> f64| samples.iter().map(f).sum::<f64>() / n;
        let avg_opt = |f: fn(&Self) -> Option<f64>| {
            samples
                .iter()
                .map(f)
                .sum::<Option<f64>>()
                .map(|total| total / n)
        };

        Some(Self {
            epoch: avg(|s| s.epoch),
            r_km: avg(|s| s.r_km),
            theta: avg_opt(|s| s.theta),
            phi: avg_opt(|s| s.phi),
            vr: avg(|s| s.vr),
            np: avg(|s| s.np),
            temp: avg(|s| s.temp),
        })
    }
}

/// A sample with its instrument provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaggedSample {
    pub sample: Sample,
    pub instrument: Instrument,
}

// ============================================================================
// SampleSet
// ============================================================================

/// Time-ordered samples from one instrument.
///
/// Ascending timestamps are enforced at construction: turn-around detection
/// and temporal averaging silently produce wrong results on unordered input.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    instrument: Instrument,
    source: String,
    samples: Vec<Sample>,
}

impl SampleSet {
    /// Build a set, failing on the first timestamp that goes backwards.
    pub fn new(
        instrument: Instrument,
        source: impl Into<String>,
        samples: Vec<Sample>,
    ) -> Result<Self> {
        let source = source.into();
        check_ascending(&source, &samples, 0)?;
        Ok(Self {
            instrument,
            source,
            samples,
        })
    }

    /// Build a set by sorting the samples by timestamp first.
    pub fn sorted(instrument: Instrument, source: impl Into<String>, mut samples: Vec<Sample>) -> Self {
        samples.sort_by(|a, b| a.epoch.total_cmp(&b.epoch));
        Self {
            instrument,
            source: source.into(),
            samples,
        }
    }

    pub fn empty(instrument: Instrument, source: impl Into<String>) -> Self {
        Self {
            instrument,
            source: source.into(),
            samples: Vec::new(),
        }
    }

    /// Append a later set from the same instrument.
    ///
    /// The appended samples must continue the time ordering, so files are
    /// expected in chronological order.
    pub fn extend(&mut self, other: Self) -> Result<()> {
        let offset = self.samples.len();
        let mut joined = std::mem::take(&mut self.samples);
        joined.extend(other.samples);
        if let Err(e) = check_ascending(&self.source, &joined, offset.saturating_sub(1)) {
            joined.truncate(offset);
            self.samples = joined;
            return Err(e);
        }
        self.samples = joined;
        Ok(())
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Heliocentric distances (km) in time order
    pub fn distances_km(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.r_km).collect()
    }

    pub fn tagged(&self) -> impl Iterator<Item = TaggedSample> + '_ {
        self.samples.iter().map(|&sample| TaggedSample {
            sample,
            instrument: self.instrument,
        })
    }
}

fn check_ascending(source: &str, samples: &[Sample], from: usize) -> Result<()> {
    let start = from.min(samples.len());
    for (offset, pair) in samples[start..].windows(2).enumerate() {
        // NaN timestamps fail the comparison too
        if !(pair[1].epoch >= pair[0].epoch) {
            return Err(PipelineError::UnorderedInput {
                source_name: source.to_string(),
                index: start + offset + 1,
                previous: pair[0].epoch,
                current: pair[1].epoch,
            });
        }
    }
    Ok(())
}

// ============================================================================
// EncounterSet
// ============================================================================

/// Both instruments' reduced samples for one orbital pass.
#[derive(Debug, Clone)]
pub struct EncounterSet {
    pub name: String,
    pub primary: SampleSet,
    pub secondary: SampleSet,
}

impl EncounterSet {
    pub fn instrument(&self, instrument: Instrument) -> &SampleSet {
        match instrument {
            Instrument::Primary => &self.primary,
            Instrument::Secondary => &self.secondary,
        }
    }

    /// All samples, primary first, tagged with their instrument.
    pub fn tagged(&self) -> Vec<TaggedSample> {
        self.primary.tagged().chain(self.secondary.tagged()).collect()
    }

    pub fn len(&self) -> usize {
        self.primary.len() + self.secondary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.secondary.is_empty()
    }
}
