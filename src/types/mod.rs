//! Shared data structures for the solar-wind reduction pipeline
//!
//! - `Sample` / `SampleSet`: one reduced measurement and an ordered run of them
//! - `Instrument` / `TaggedSample`: provenance carried through binning
//! - `EncounterSet`: both instruments for one orbital pass
//! - `Quantity` / `StatKind`: the fixed physical quantities and statistics

mod sample;
mod quantity;

pub use sample::*;
pub use quantity::*;
