//! Measurement Reduction
//!
//! Turns raw per-file channel arrays into physically valid, time-averaged
//! [`SampleSet`](crate::types::SampleSet)s.
//!
//! ## Stages
//!
//! 1. `quality_filter`: flag bits, fill values, field-of-view rejection
//! 2. `instrument`: unit conversion and ceiling restriction per instrument
//! 3. `averager`: fixed-window temporal averaging

pub mod averager;
pub mod instrument;
pub mod quality_filter;

pub use averager::TemporalAverager;
pub use instrument::{InstrumentReducer, Reduction, ReductionCounts};
pub use quality_filter::{drop_rejected, FilterResult, QualityFilter, RejectSet, RejectionBreakdown};
