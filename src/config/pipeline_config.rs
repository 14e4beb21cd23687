//! Pipeline Configuration - every reduction tunable as a TOML value
//!
//! Each struct implements `Default` with the values used for the published
//! reduction, so an empty or missing config file reproduces it exactly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "HELIOPROFILE_CONFIG";

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "helioprofile.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one reduction run.
///
/// Load with `PipelineConfig::load()` which searches:
/// 1. `$HELIOPROFILE_CONFIG` env var
/// 2. `./helioprofile.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Input and output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Encounters to process and instrument folder names
    #[serde(default)]
    pub encounters: EncounterConfig,

    /// Heliocentric distance binning
    #[serde(default)]
    pub binning: BinningConfig,

    /// Temporal averaging
    #[serde(default)]
    pub averaging: AveragingConfig,

    /// Data-quality rejection
    #[serde(default)]
    pub quality: QualityConfig,
}

impl PipelineConfig {
    /// Load configuration using the standard search order:
    /// 1. `$HELIOPROFILE_CONFIG` environment variable
    /// 2. `./helioprofile.toml` in the current working directory
    /// 3. Built-in defaults
    ///
    /// A config file that is found but fails to parse or validate is an
    /// error; the run never falls back to defaults past a broken file.
    pub fn load() -> Result<Self, ConfigError> {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                let config = Self::load_from_file(&p)?;
                info!(path = %p.display(), "Loaded pipeline config from {}", CONFIG_ENV_VAR);
                return Ok(config);
            }
            warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
        }

        // 2. Check ./helioprofile.toml
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            let config = Self::load_from_file(&local)?;
            info!(path = %local.display(), "Loaded pipeline config");
            return Ok(config);
        }

        // 3. Defaults
        info!("No pipeline config found, using built-in defaults");
        Ok(Self::default())
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys only produce warnings; range violations are errors.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        // Two-pass: check for unknown keys first (warnings only)
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the effective configuration back to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();
        let b = &self.binning;

        if !(b.bin_width.is_finite() && b.bin_width > 0.0) {
            errors.push(format!("binning.bin_width = {} must be a positive number", b.bin_width));
        }
        if !(b.max_domain > b.lower_bound) {
            errors.push(format!(
                "binning.max_domain ({}) must exceed binning.lower_bound ({})",
                b.max_domain, b.lower_bound
            ));
        } else if b.bin_width > 0.0 && !b.tiles_evenly() {
            errors.push(format!(
                "range {} to {} with bin width {} cannot be divided into equal bins",
                b.lower_bound, b.max_domain, b.bin_width
            ));
        }
        if !(b.ceiling > b.lower_bound && b.ceiling <= b.max_domain) {
            errors.push(format!(
                "binning.ceiling = {} must lie in ({}, {}]",
                b.ceiling, b.lower_bound, b.max_domain
            ));
        }
        if b.file_prefix.trim().is_empty() {
            errors.push("binning.file_prefix must not be empty".to_string());
        }

        let w = self.averaging.window_secs;
        if !(w.is_finite() && w > 0.0) {
            errors.push(format!("averaging.window_secs = {w} must be a positive number"));
        }

        for &bit in &self.quality.secondary_bad_bits {
            if bit >= defaults::FLAG_FIELD_BITS {
                errors.push(format!(
                    "quality.secondary_bad_bits contains {bit}, flag field has {} bits",
                    defaults::FLAG_FIELD_BITS
                ));
            }
        }

        if self.encounters.names.is_empty() {
            errors.push("encounters.names must list at least one encounter".to_string());
        }
        if self.encounters.primary_dir == self.encounters.secondary_dir {
            errors.push(format!(
                "encounters.primary_dir and secondary_dir are both '{}'",
                self.encounters.primary_dir
            ));
        }

        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Paths
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root holding one folder per encounter
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,

    /// Output root; binned and split tables go into fixed sub-directories
    #[serde(default = "default_statistics_dir")]
    pub statistics_dir: PathBuf,

    /// Plain-text execution log
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_data_root() -> PathBuf {
    PathBuf::from(defaults::DATA_ROOT)
}
fn default_statistics_dir() -> PathBuf {
    PathBuf::from(defaults::STATISTICS_DIR)
}
fn default_log_file() -> PathBuf {
    PathBuf::from(defaults::EXECUTION_LOG)
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            statistics_dir: default_statistics_dir(),
            log_file: default_log_file(),
        }
    }
}

// ============================================================================
// Encounters
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterConfig {
    /// Encounter folder names, processed in this order
    #[serde(default = "default_encounter_names")]
    pub names: Vec<String>,

    /// Primary-instrument folder inside each encounter folder
    #[serde(default = "default_primary_dir")]
    pub primary_dir: String,

    /// Secondary-instrument folder inside each encounter folder
    #[serde(default = "default_secondary_dir")]
    pub secondary_dir: String,
}

fn default_encounter_names() -> Vec<String> {
    ["encounter_7", "encounter_8", "encounter_9"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_primary_dir() -> String {
    defaults::PRIMARY_DIR.to_string()
}
fn default_secondary_dir() -> String {
    defaults::SECONDARY_DIR.to_string()
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            names: default_encounter_names(),
            primary_dir: default_primary_dir(),
            secondary_dir: default_secondary_dir(),
        }
    }
}

// ============================================================================
// Binning
// ============================================================================

/// How the domain ceiling treats the bin that straddles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CeilingBoundary {
    /// Emit bins while their left edge does not exceed the ceiling and keep
    /// every sample in them, so data up to one bin width past the ceiling
    /// can be included.
    Inclusive,
    /// Emit only bins starting below the ceiling and drop samples at or
    /// above it.
    Exclusive,
}

/// Representative distance written for each bin in the statistics table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceLabel {
    LeftEdge,
    Centre,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinningConfig {
    /// Bin width (solar radii)
    #[serde(default = "default_bin_width")]
    pub bin_width: f64,

    /// Lower edge of the binned domain (solar radii)
    #[serde(default = "default_lower_bound")]
    pub lower_bound: f64,

    /// Upper edge of the binned domain (solar radii)
    #[serde(default = "default_max_domain")]
    pub max_domain: f64,

    /// Simulation-domain ceiling (solar radii)
    #[serde(default = "default_ceiling")]
    pub ceiling: f64,

    #[serde(default = "default_ceiling_boundary")]
    pub ceiling_boundary: CeilingBoundary,

    #[serde(default = "default_distance_label")]
    pub distance_label: DistanceLabel,

    /// Drop samples beyond the ceiling during reduction, before averaging
    #[serde(default = "default_true")]
    pub restrict_to_ceiling: bool,

    /// Prefix for per-bin table names
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_bin_width() -> f64 {
    defaults::BIN_WIDTH_RS
}
fn default_lower_bound() -> f64 {
    defaults::LOWER_BOUND_RS
}
fn default_max_domain() -> f64 {
    defaults::MAX_DOMAIN_RS
}
fn default_ceiling() -> f64 {
    defaults::CEILING_RS
}
fn default_ceiling_boundary() -> CeilingBoundary {
    CeilingBoundary::Exclusive
}
fn default_distance_label() -> DistanceLabel {
    DistanceLabel::LeftEdge
}
fn default_true() -> bool {
    true
}
fn default_file_prefix() -> String {
    defaults::BIN_FILE_PREFIX.to_string()
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            bin_width: default_bin_width(),
            lower_bound: default_lower_bound(),
            max_domain: default_max_domain(),
            ceiling: default_ceiling(),
            ceiling_boundary: default_ceiling_boundary(),
            distance_label: default_distance_label(),
            restrict_to_ceiling: true,
            file_prefix: default_file_prefix(),
        }
    }
}

impl BinningConfig {
    /// Number of bins covering [lower_bound, max_domain)
    pub fn bin_count(&self) -> usize {
        ((self.max_domain - self.lower_bound) / self.bin_width).round() as usize
    }

    /// Whether the domain divides into a whole number of bins.
    pub fn tiles_evenly(&self) -> bool {
        let n = (self.max_domain - self.lower_bound) / self.bin_width;
        (n - n.round()).abs() <= defaults::TILING_TOLERANCE * n.abs().max(1.0)
    }
}

// ============================================================================
// Averaging
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AveragingConfig {
    /// Window length (seconds)
    #[serde(default = "default_window_secs")]
    pub window_secs: f64,
}

fn default_window_secs() -> f64 {
    defaults::AVERAGING_WINDOW_SECS
}

impl Default for AveragingConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
        }
    }
}

// ============================================================================
// Quality
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Values at or below this are fill values
    #[serde(default = "default_sentinel")]
    pub sentinel: f64,

    /// Secondary flag bit positions that reject a sample
    #[serde(default = "default_bad_bits")]
    pub secondary_bad_bits: Vec<u8>,

    /// Reject secondary samples whose flux peak bin is at or below this index
    #[serde(default = "default_fov_threshold")]
    pub fov_threshold_index: usize,
}

fn default_sentinel() -> f64 {
    defaults::SENTINEL_THRESHOLD
}
fn default_bad_bits() -> Vec<u8> {
    defaults::SECONDARY_BAD_BITS.to_vec()
}
fn default_fov_threshold() -> usize {
    defaults::FOV_THRESHOLD_INDEX
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            sentinel: default_sentinel(),
            secondary_bad_bits: default_bad_bits(),
            fov_threshold_index: default_fov_threshold(),
        }
    }
}
