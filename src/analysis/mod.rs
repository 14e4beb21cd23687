//! Radial Profile Analysis
//!
//! Everything that runs once all encounters are reduced.
//!
//! ## Modules
//!
//! - `turn_around`: perihelion detection and inbound/outbound segmentation
//! - `radial_binner`: heliocentric-distance bins with ceiling handling
//! - `stats_reducer`: per-bin five-number summaries (statrs)

pub mod radial_binner;
pub mod stats_reducer;
pub mod turn_around;

pub use radial_binner::{bin_file_name, decimal_length, BinGroup, DistanceBin, InstrumentCounts, RadialBinner};
pub use stats_reducer::{percentile, BinCount, StatRow, StatisticsTable, StatsReducer, Summary, SCHEMA_VERSION};
pub use turn_around::{find_turn_around, segment_names, OrbitSegment, OrbitSegmenter, SegmentLabel};
