//! Orbit Segmentation at the Turn-Around Point
//!
//! Splits one encounter's orbital pass at perihelion (minimum heliocentric
//! distance) into an inbound and an outbound segment. Both segments keep
//! the perihelion sample.
//!
//! With two instruments each one's turn-around is located on its own
//! samples, then the inbound halves are joined (primary first) and so are
//! the outbound halves. The two turn-around times are assumed, not checked,
//! to be close.

use serde::{Deserialize, Serialize};

use crate::types::{EncounterSet, SampleSet, TaggedSample};

/// Direction of a segment relative to the Sun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SegmentLabel {
    /// Distance decreases over the segment
    Approach,
    /// Distance does not decrease over the segment
    Recession,
}

impl SegmentLabel {
    /// Classify by first versus last distance.
    pub fn classify(first: f64, last: f64) -> Self {
        if first > last {
            Self::Approach
        } else {
            Self::Recession
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Approach => "APPROACH",
            Self::Recession => "RECESSION",
        }
    }
}

/// One labeled half of an orbital pass.
#[derive(Debug, Clone)]
pub struct OrbitSegment {
    pub label: SegmentLabel,
    /// Distance of the first sample (solar radii)
    pub r_start_rs: f64,
    /// Distance of the last sample (solar radii)
    pub r_end_rs: f64,
    pub samples: Vec<TaggedSample>,
}

impl OrbitSegment {
    fn from_samples(samples: Vec<TaggedSample>) -> Option<Self> {
        let r_start_rs = samples.first()?.sample.r_rs();
        let r_end_rs = samples.last()?.sample.r_rs();
        Some(Self {
            label: SegmentLabel::classify(r_start_rs, r_end_rs),
            r_start_rs,
            r_end_rs,
            samples,
        })
    }

    /// `{encounter}_{APPROACH|RECESSION}_{r_start:.1}-{r_end:.1}Rs`
    pub fn name(&self, encounter: &str) -> String {
        format!(
            "{}_{}_{:.1}-{:.1}Rs",
            encounter,
            self.label.label(),
            self.r_start_rs,
            self.r_end_rs
        )
    }
}

/// Index of the minimum distance, first one on ties. NaN never wins.
pub fn find_turn_around(distances: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &d) in distances.iter().enumerate() {
        match best {
            Some((_, bd)) if !(d < bd) => {}
            _ if d.is_nan() => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Orbit segmenter
pub struct OrbitSegmenter;

impl OrbitSegmenter {
    /// Inbound `[0, tap]` and outbound `[tap, end]` halves of one set.
    ///
    /// Empty for a set without samples.
    pub fn split(set: &SampleSet) -> Option<(Vec<TaggedSample>, Vec<TaggedSample>)> {
        let tap = find_turn_around(&set.distances_km())?;
        let tagged: Vec<TaggedSample> = set.tagged().collect();
        Some((tagged[..=tap].to_vec(), tagged[tap..].to_vec()))
    }

    /// Joint inbound and outbound segments of an encounter, inbound first.
    ///
    /// An instrument with no samples contributes nothing; an encounter
    /// without any samples yields no segments. When both halves hold the
    /// same samples (a single-sample pass) only one segment is returned.
    pub fn segment(encounter: &EncounterSet) -> Vec<OrbitSegment> {
        let mut inbound = Vec::new();
        let mut outbound = Vec::new();
        for set in [&encounter.primary, &encounter.secondary] {
            if let Some((inb, outb)) = Self::split(set) {
                inbound.extend(inb);
                outbound.extend(outb);
            }
        }
        if outbound == inbound {
            outbound.clear();
        }

        [inbound, outbound]
            .into_iter()
            .filter_map(OrbitSegment::from_samples)
            .collect()
    }
}

/// Segment file names for one encounter, unique within it.
///
/// Halves whose label and rounded endpoints coincide would share a name;
/// later ones get a `_2`, `_3`, ... suffix.
pub fn segment_names(encounter: &str, segments: &[OrbitSegment]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(segments.len());
    for segment in segments {
        let base = segment.name(encounter);
        let mut name = base.clone();
        let mut n = 2;
        while names.contains(&name) {
            name = format!("{base}_{n}");
            n += 1;
        }
        names.push(name);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics_engine::constants::SOLAR_RADIUS_KM;
    use crate::types::{Instrument, Sample};

    fn set(instrument: Instrument, r_rs: &[f64]) -> SampleSet {
        let samples = r_rs
            .iter()
            .enumerate()
            .map(|(i, &r)| Sample {
                epoch: i as f64 * 60.0,
                r_km: r * SOLAR_RADIUS_KM,
                theta: None,
                phi: None,
                vr: 300.0,
                np: 100.0,
                temp: 1e5,
            })
            .collect();
        SampleSet::new(instrument, "enc", samples).unwrap()
    }

    #[test]
    fn test_turn_around_is_global_minimum() {
        let d = [30.0, 25.0, 20.0, 13.3, 14.0, 22.0, 35.0];
        assert_eq!(find_turn_around(&d), Some(3));
        assert_eq!(find_turn_around(&[5.0, 5.0, 6.0]), Some(0));
        assert_eq!(find_turn_around(&[f64::NAN, 3.0, 2.0]), Some(2));
        assert_eq!(find_turn_around(&[]), None);
    }

    #[test]
    fn test_segments_reconstruct_sequence() {
        let d = [30.0, 25.0, 20.0, 13.3, 14.0, 22.0, 35.0];
        let s = set(Instrument::Primary, &d);
        let (inb, outb) = OrbitSegmenter::split(&s).unwrap();
        assert_eq!(inb.len(), 4);
        assert_eq!(outb.len(), 4);
        let rebuilt: Vec<f64> = inb
            .iter()
            .chain(outb.iter().skip(1))
            .map(|t| t.sample.r_rs())
            .collect();
        for (a, b) in rebuilt.iter().zip(d.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
        assert_eq!(rebuilt.len(), d.len());
    }

    #[test]
    fn test_labels_and_names() {
        let enc = EncounterSet {
            name: "encounter_7".into(),
            primary: set(Instrument::Primary, &[30.0, 20.0, 13.3, 25.04]),
            secondary: SampleSet::empty(Instrument::Secondary, "enc"),
        };
        let segments = OrbitSegmenter::segment(&enc);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].label, SegmentLabel::Approach);
        assert_eq!(segments[1].label, SegmentLabel::Recession);
        assert_eq!(segments[0].name("encounter_7"), "encounter_7_APPROACH_30.0-13.3Rs");
        assert_eq!(segments[1].name("encounter_7"), "encounter_7_RECESSION_13.3-25.0Rs");
    }

    #[test]
    fn test_joint_segmentation_concatenates_instruments() {
        let enc = EncounterSet {
            name: "e".into(),
            primary: set(Instrument::Primary, &[30.0, 20.0, 15.0, 18.0]),
            secondary: set(Instrument::Secondary, &[28.0, 16.0, 14.0, 19.0, 26.0]),
        };
        let segments = OrbitSegmenter::segment(&enc);
        assert_eq!(segments[0].samples.len(), 3 + 3);
        assert_eq!(segments[1].samples.len(), 2 + 3);
        assert_eq!(segments[0].samples[0].instrument, Instrument::Primary);
        assert_eq!(segments[0].samples[5].instrument, Instrument::Secondary);
        // Classified on the joined sequence's endpoints
        assert!((segments[0].r_start_rs - 30.0).abs() < 1e-9);
        assert!((segments[0].r_end_rs - 14.0).abs() < 1e-9);
        assert!((segments[1].r_end_rs - 26.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_sample_and_empty_encounter() {
        let one = EncounterSet {
            name: "e".into(),
            primary: set(Instrument::Primary, &[12.0]),
            secondary: SampleSet::empty(Instrument::Secondary, "e"),
        };
        let segments = OrbitSegmenter::segment(&one);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].label, SegmentLabel::Recession);
        assert_eq!(segment_names("e", &segments), vec!["e_RECESSION_12.0-12.0Rs"]);

        let empty = EncounterSet {
            name: "e".into(),
            primary: SampleSet::empty(Instrument::Primary, "e"),
            secondary: SampleSet::empty(Instrument::Secondary, "e"),
        };
        assert!(OrbitSegmenter::segment(&empty).is_empty());
    }

    #[test]
    fn test_colliding_segment_names_are_made_unique() {
        // Minimum first: a one-sample inbound half and a flat outbound half
        let enc = EncounterSet {
            name: "e".into(),
            primary: set(Instrument::Primary, &[12.0, 12.04, 12.0]),
            secondary: SampleSet::empty(Instrument::Secondary, "e"),
        };
        let segments = OrbitSegmenter::segment(&enc);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].name("e"), segments[1].name("e"));

        let names = segment_names("e", &segments);
        assert_eq!(names, vec!["e_RECESSION_12.0-12.0Rs", "e_RECESSION_12.0-12.0Rs_2"]);
    }
}
