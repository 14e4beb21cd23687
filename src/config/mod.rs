//! Pipeline Configuration Module
//!
//! Provides the run configuration loaded from TOML files. Every tunable of
//! the reduction (bin width, ceiling, averaging window, quality thresholds,
//! directory layout) lives here.
//!
//! ## Loading Order
//!
//! 1. `HELIOPROFILE_CONFIG` environment variable (path to TOML file)
//! 2. `helioprofile.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! The configuration is an explicit value handed to the pipeline:
//!
//! ```ignore
//! let config = PipelineConfig::load()?;
//! let pipeline = Pipeline::new(config, source)?;
//! ```

mod pipeline_config;
pub mod defaults;
pub mod validation;

pub use pipeline_config::*;
