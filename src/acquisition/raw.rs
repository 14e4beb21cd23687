//! Raw per-file channel arrays and the source trait that produces them

use crate::error::{PipelineError, Result};

/// One raw instrument file: its name (a date stamp in practice) and the
/// channel arrays read from it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFile<C> {
    pub name: String,
    pub channels: C,
}

/// Channels delivered for the primary instrument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimaryChannels {
    /// Seconds
    pub epoch: Vec<f64>,
    /// General quality flag, zero when clean
    pub flag: Vec<i64>,
    /// Spacecraft position (km)
    pub pos_x: Vec<f64>,
    pub pos_y: Vec<f64>,
    pub pos_z: Vec<f64>,
    /// Radial velocity (km/s)
    pub vr: Vec<f64>,
    /// Proton density (cm⁻³)
    pub np: Vec<f64>,
    /// Thermal speed (km/s)
    pub wp: Vec<f64>,
}

/// Channels delivered for the secondary instrument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecondaryChannels {
    /// Seconds
    pub epoch: Vec<f64>,
    /// Quality bit field
    pub flag: Vec<i64>,
    /// Heliocentric distance (km)
    pub sun_dist: Vec<f64>,
    /// Ion radial velocity including spacecraft motion (km/s)
    pub vr: Vec<f64>,
    /// Spacecraft radial velocity (km/s)
    pub sc_vr: Vec<f64>,
    /// Proton density (cm⁻³)
    pub np: Vec<f64>,
    /// Temperature (eV)
    pub temp: Vec<f64>,
    /// Energy flux per azimuth bin, one row per sample
    pub eflux: Vec<Vec<f64>>,
}

/// Channel arrays that share one index space.
pub trait Channels {
    /// Number of samples, taken from the epoch channel
    fn len(&self) -> usize;

    /// Every other channel with its name, for length checks
    fn channel_lengths(&self) -> Vec<(&'static str, usize)>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fail if any channel disagrees with the epoch channel length.
    fn check_lengths(&self, file: &str) -> Result<()> {
        let expected = self.len();
        for (channel, found) in self.channel_lengths() {
            if found != expected {
                return Err(PipelineError::ChannelLengthMismatch {
                    file: file.to_string(),
                    channel,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }
}

impl Channels for PrimaryChannels {
    fn len(&self) -> usize {
        self.epoch.len()
    }

    fn channel_lengths(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("flag", self.flag.len()),
            ("pos_x", self.pos_x.len()),
            ("pos_y", self.pos_y.len()),
            ("pos_z", self.pos_z.len()),
            ("vr", self.vr.len()),
            ("np", self.np.len()),
            ("wp", self.wp.len()),
        ]
    }
}

impl Channels for SecondaryChannels {
    fn len(&self) -> usize {
        self.epoch.len()
    }

    fn channel_lengths(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("flag", self.flag.len()),
            ("sun_dist", self.sun_dist.len()),
            ("vr", self.vr.len()),
            ("sc_vr", self.sc_vr.len()),
            ("np", self.np.len()),
            ("temp", self.temp.len()),
            ("eflux", self.eflux.len()),
        ]
    }
}

/// Trait abstracting where raw instrument files come from.
///
/// Files are returned in chronological order; a missing encounter or
/// instrument location is a fatal `MissingDirectory` error.
pub trait RawSource {
    fn primary_files(&self, encounter: &str) -> Result<Vec<RawFile<PrimaryChannels>>>;

    fn secondary_files(&self, encounter: &str) -> Result<Vec<RawFile<SecondaryChannels>>>;

    /// Human-readable name for logging (e.g. "CSV").
    fn source_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_names_channel() {
        let channels = PrimaryChannels {
            epoch: vec![0.0, 1.0],
            flag: vec![0, 0],
            pos_x: vec![1.0, 1.0],
            pos_y: vec![0.0, 0.0],
            pos_z: vec![0.0, 0.0],
            vr: vec![300.0],
            np: vec![10.0, 10.0],
            wp: vec![40.0, 40.0],
        };
        match channels.check_lengths("20210101.csv") {
            Err(PipelineError::ChannelLengthMismatch { channel, expected, found, .. }) => {
                assert_eq!(channel, "vr");
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_channels_are_consistent() {
        assert!(SecondaryChannels::default().check_lengths("f").is_ok());
        assert!(SecondaryChannels::default().is_empty());
    }
}
