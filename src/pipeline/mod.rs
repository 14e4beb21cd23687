//! Processing Pipeline Module
//!
//! ## Run Architecture
//!
//! ```text
//! raw files -> quality filter -> transform -> temporal averager
//!           -> (accumulate across files and encounters)
//!           -> orbit segmenter (split tables)
//!           -> radial binner (bin tables) -> statistics reducer
//! ```
//!
//! Strictly sequential: one file at a time, one encounter at a time.

mod coordinator;

pub use coordinator::{EncounterSummary, Pipeline, RunSummary};
