//! System-wide default constants.
//!
//! Every tunable in `PipelineConfig` falls back to one of these values.
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Paths
// ============================================================================

/// Root directory holding one folder per encounter.
pub const DATA_ROOT: &str = "DATA";

/// Output root for statistics, binned and split tables.
pub const STATISTICS_DIR: &str = "STATISTICS";

/// Sub-directory (of the statistics dir) for per-bin sample tables.
pub const BINNED_SUBDIR: &str = "BINNED_DATA";

/// Sub-directory (of the statistics dir) for approach/recession tables.
pub const SPLIT_SUBDIR: &str = "SPLIT_DATA";

/// File name of the combined statistics table.
pub const STATISTICS_FILE: &str = "statistics.json";

/// Plain-text execution log.
pub const EXECUTION_LOG: &str = "EXECUTE_LOG.dat";

/// Folder name of the primary instrument inside an encounter folder.
pub const PRIMARY_DIR: &str = "primary";

/// Folder name of the secondary instrument inside an encounter folder.
pub const SECONDARY_DIR: &str = "secondary";

// ============================================================================
// Binning
// ============================================================================

/// Distance bin width (solar radii).
pub const BIN_WIDTH_RS: f64 = 1.0;

/// Lower edge of the binning domain (solar radii).
pub const LOWER_BOUND_RS: f64 = 0.0;

/// Upper edge of the binning domain (solar radii); distances at or
/// beyond it cannot be assigned.
pub const MAX_DOMAIN_RS: f64 = 100.0;

/// Outer boundary of the simulation domain (solar radii).
pub const CEILING_RS: f64 = 40.0;

/// File name prefix for per-bin tables.
pub const BIN_FILE_PREFIX: &str = "BIN";

/// Relative tolerance when checking that the domain tiles into whole bins.
pub const TILING_TOLERANCE: f64 = 1e-9;

// ============================================================================
// Averaging
// ============================================================================

/// Temporal averaging window (seconds).
pub const AVERAGING_WINDOW_SECS: f64 = 10.0;

// ============================================================================
// Quality
// ============================================================================

/// Values at or below this are instrument fill values.
pub const SENTINEL_THRESHOLD: f64 = -0.5e30;

/// Secondary-instrument flag bits that mark a sample as bad.
pub const SECONDARY_BAD_BITS: [u8; 3] = [0, 1, 2];

/// Highest angular-flux bin index that still rejects a sample.
///
/// Bins 0 and 1 sit at roughly 175° and 160°: a flux peak there means the
/// distribution core is outside the field of view.
pub const FOV_THRESHOLD_INDEX: usize = 1;

/// Width of the quality flag field (bits).
pub const FLAG_FIELD_BITS: u8 = 16;
