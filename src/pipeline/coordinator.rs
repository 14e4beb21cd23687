//! Pipeline Coordinator - sequential reduction and binning run
//!
//! ```text
//! PHASE 1: Prepare output directories (cleared every run)
//! PHASE 2: Per encounter, per instrument, per file:
//!          quality filter -> transform -> ceiling restriction -> averaging
//! PHASE 3: Per encounter: turn-around segmentation (split tables)
//! PHASE 4: All encounters: radial binning (bin tables)
//! PHASE 5: Statistics reduction (statistics table)
//! PHASE 6: Execution log
//! ```
//!
//! Any error aborts the run. Phase 1 removes every artifact of the
//! previous run, so a failed run leaves no stale tables behind.

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::acquisition::RawSource;
use crate::analysis::{bin_file_name, segment_names, OrbitSegmenter, RadialBinner, StatsReducer};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::reduction::{InstrumentReducer, ReductionCounts};
use crate::storage::{remove_stale, ExecutionLog, OutputLayout, SampleTable};
use crate::types::{EncounterSet, Instrument, SampleSet, TaggedSample};

/// Reduction counts of one encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncounterSummary {
    pub name: String,
    pub primary: ReductionCounts,
    pub secondary: ReductionCounts,
}

impl EncounterSummary {
    pub const fn counts(&self, instrument: Instrument) -> ReductionCounts {
        match instrument {
            Instrument::Primary => self.primary,
            Instrument::Secondary => self.secondary,
        }
    }
}

/// What one run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub encounters: Vec<EncounterSummary>,
    /// Non-empty bins written
    pub bins: usize,
    /// Samples across all written bins
    pub binned_samples: usize,
    pub segment_files: Vec<PathBuf>,
    pub bin_files: Vec<PathBuf>,
    pub statistics_file: PathBuf,
    pub log_file: PathBuf,
}

/// Runs the whole reduction over every configured encounter.
pub struct Pipeline<S: RawSource> {
    config: PipelineConfig,
    source: S,
}

impl<S: RawSource> Pipeline<S> {
    /// Validate the configuration and bind it to a raw source.
    pub fn new(config: PipelineConfig, source: S) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, source })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Reduce every file of one encounter into an [`EncounterSet`].
    pub fn reduce_encounter(&self, name: &str) -> Result<(EncounterSet, EncounterSummary)> {
        let reducer = InstrumentReducer::new(&self.config);

        let mut primary = SampleSet::empty(Instrument::Primary, name);
        let mut primary_counts = ReductionCounts::default();
        for file in self.source.primary_files(name)? {
            info!(encounter = name, instrument = "primary", file = %file.name, "Currently handling file");
            let reduced = reducer.reduce_primary(&file)?;
            primary_counts += reduced.counts;
            primary.extend(reduced.samples)?;
        }

        let mut secondary = SampleSet::empty(Instrument::Secondary, name);
        let mut secondary_counts = ReductionCounts::default();
        for file in self.source.secondary_files(name)? {
            info!(encounter = name, instrument = "secondary", file = %file.name, "Currently handling file");
            let reduced = reducer.reduce_secondary(&file)?;
            secondary_counts += reduced.counts;
            secondary.extend(reduced.samples)?;
        }

        if primary.is_empty() && secondary.is_empty() {
            warn!(encounter = name, "Encounter has no samples after reduction");
        }

        Ok((
            EncounterSet {
                name: name.to_string(),
                primary,
                secondary,
            },
            EncounterSummary {
                name: name.to_string(),
                primary: primary_counts,
                secondary: secondary_counts,
            },
        ))
    }

    /// Execute the full run.
    pub fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        let config = &self.config;
        info!(
            source = self.source.source_name(),
            encounters = config.encounters.names.len(),
            bin_width = config.binning.bin_width,
            "Starting reduction run"
        );

        // PHASE 1
        let layout = OutputLayout::from_config(config);
        layout.prepare()?;
        remove_stale(&config.paths.log_file)?;
        let mut log = ExecutionLog::new(Utc::now(), config.binning.bin_width, config.averaging.window_secs);

        // PHASE 2-3
        let mut all_samples: Vec<TaggedSample> = Vec::new();
        let mut encounters = Vec::new();
        let mut segment_files = Vec::new();
        for name in &config.encounters.names {
            let (encounter, summary) = self.reduce_encounter(name)?;

            let segments = OrbitSegmenter::segment(&encounter);
            for (segment, seg_name) in segments.iter().zip(segment_names(name, &segments)) {
                let table = SampleTable::segment(seg_name, &segment.samples);
                segment_files.push(layout.write_segment(&table)?);
                debug!(segment = %table.name, rows = table.rows.len(), "Wrote segment table");
            }

            log.record_encounter(
                name,
                &[
                    (Instrument::Primary, summary.primary),
                    (Instrument::Secondary, summary.secondary),
                ],
            );
            info!(
                encounter = %name,
                primary = summary.primary.averaged,
                secondary = summary.secondary.averaged,
                "Encounter reduced"
            );
            all_samples.extend(encounter.tagged());
            encounters.push(summary);
        }

        // PHASE 4
        let binner = RadialBinner::from_config(&config.binning);
        let groups = binner.group(&all_samples)?;
        let mut bin_files = Vec::with_capacity(groups.len());
        for group in &groups {
            let name = bin_file_name(&config.binning.file_prefix, &group.bin, config.binning.bin_width);
            bin_files.push(layout.write_bin(&SampleTable::new(name, &group.samples))?);
        }
        let binned_samples: usize = groups.iter().map(|g| g.counts.total()).sum();

        // PHASE 5
        let table = StatsReducer::table(&groups, &config.binning);
        let statistics_file = layout.write_statistics(&table)?;

        // PHASE 6
        log.finish(groups.len(), binned_samples);
        log.write(&config.paths.log_file)?;

        info!(
            bins = groups.len(),
            samples = binned_samples,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Reduction run complete"
        );

        Ok(RunSummary {
            encounters,
            bins: groups.len(),
            binned_samples,
            segment_files,
            bin_files,
            statistics_file,
            log_file: config.paths.log_file.clone(),
        })
    }
}
