//! helioprofile: Solar-Wind Radial Profile Reduction
//!
//! Reduces in-situ plasma measurements from two instruments to physically
//! valid samples, bins them by heliocentric distance and summarizes every
//! bin, for comparison against MHD simulation profiles.
//!
//! ## Architecture
//!
//! - **Acquisition**: raw per-file channel arrays behind the `RawSource` trait
//! - **Reduction**: quality filter, coordinate transforms, temporal averaging
//! - **Analysis**: turn-around segmentation, radial binning, statistics
//! - **Storage**: versioned JSON tables and the execution log
//! - **Pipeline**: the sequential run over every configured encounter

pub mod acquisition;
pub mod analysis;
pub mod config;
pub mod error;
pub mod physics_engine;
pub mod pipeline;
pub mod reduction;
pub mod simulation;
pub mod storage;
pub mod types;

// Re-export configuration
pub use config::PipelineConfig;

// Re-export error types
pub use error::{PipelineError, Result};

// Re-export commonly used types
pub use types::{EncounterSet, Instrument, Quantity, Sample, SampleSet, StatKind, TaggedSample};

// Re-export the run entry points
pub use acquisition::{CsvDirectorySource, RawSource};
pub use pipeline::{Pipeline, RunSummary};
pub use simulation::{compare, SimulationProfile};
