//! Pipeline Regression Tests
//!
//! Runs the full reduction over a small on-disk CSV tree: one encounter,
//! both instruments. Asserts on bin contents, instrument counts, fill-value
//! exclusion, rerun idempotence and the fatal missing-directory path.

use std::fs;
use std::path::Path;

use helioprofile::analysis::StatisticsTable;
use helioprofile::physics_engine::constants::SOLAR_RADIUS_KM;
use helioprofile::storage::{export::read_json, read_statistics, SampleTable};
use helioprofile::{CsvDirectorySource, Pipeline, PipelineConfig, PipelineError, StatKind};
use tempfile::TempDir;

const ENCOUNTER: &str = "encounter_test";

const PRIMARY_HEADER: &str = "epoch,flag,pos_x,pos_y,pos_z,vr,np,wp";
const SECONDARY_HEADER: &str = "epoch,flag,sun_dist,vr,sc_vr,np,temp,eflux_0,eflux_1,eflux_2,eflux_3";

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Primary rows at 60 s cadence: (r in Rs, vr)
fn primary_csv(rows: &[(f64, f64)]) -> String {
    let mut out = format!("{PRIMARY_HEADER}\n");
    for (i, (r, vr)) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{},0,{},0,0,{vr},100,40\n",
            i as f64 * 60.0,
            r * SOLAR_RADIUS_KM
        ));
    }
    out
}

/// Secondary rows at 60 s cadence with the flux peak well inside the field of view.
fn secondary_csv(rows: &[(f64, f64)]) -> String {
    let mut out = format!("{SECONDARY_HEADER}\n");
    for (i, (r, vr)) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{},0,{},{vr},10,80,20,1,2,3,9\n",
            1000.0 + i as f64 * 60.0,
            r * SOLAR_RADIUS_KM
        ));
    }
    out
}

/// Build the data tree and a config pointing at it.
fn fixture(tmp: &TempDir) -> PipelineConfig {
    let data = tmp.path().join("DATA");
    write(
        &data,
        &format!("{ENCOUNTER}/primary/20210101.csv"),
        &primary_csv(&[
            (10.2, 300.0),
            (10.5, 310.0),
            (10.8, 320.0),
            (12.4, 400.0),
            // Fill value: excluded from every output
            (14.5, -1e31),
            (12.6, 420.0),
        ]),
    );
    write(
        &data,
        &format!("{ENCOUNTER}/secondary/20210101.csv"),
        &secondary_csv(&[(10.3, 350.0), (10.7, 360.0)]),
    );

    let mut config = PipelineConfig::default();
    config.paths.data_root = data;
    config.paths.statistics_dir = tmp.path().join("STATISTICS");
    config.paths.log_file = tmp.path().join("EXECUTE_LOG.dat");
    config.encounters.names = vec![ENCOUNTER.to_string()];
    config
}

fn run(config: PipelineConfig) -> helioprofile::Result<helioprofile::RunSummary> {
    let source = CsvDirectorySource::from_config(&config);
    Pipeline::new(config, source)?.run()
}

// ============================================================================
// Binning and counts
// ============================================================================

#[test]
fn two_instruments_merge_into_one_bin() {
    let tmp = TempDir::new().unwrap();
    let summary = run(fixture(&tmp)).unwrap();

    assert_eq!(summary.bins, 2, "bins 10-11 and 12-13 only");
    assert_eq!(summary.binned_samples, 7);

    let bin: SampleTable = read_json(&tmp.path().join("STATISTICS/BINNED_DATA/BIN_10-11.json")).unwrap();
    assert_eq!(bin.rows.len(), 5);
    assert_eq!(bin.rows.iter().filter(|r| r.inst == helioprofile::Instrument::Primary).count(), 3);
    assert!(bin.rows.iter().all(|r| (10.0..11.0).contains(&r.r_rs)));

    let stats: StatisticsTable = read_statistics(&summary.statistics_file).unwrap();
    let first = &stats.counts[0];
    assert_eq!((first.bin_lo, first.bin_hi), (10.0, 11.0));
    assert_eq!((first.primary, first.secondary), (3, 2));

    // Secondary velocities are corrected for spacecraft motion (350-10, 360-10)
    let mean = stats.rows_of(StatKind::Mean).next().unwrap();
    assert_eq!(mean.distance, 10.0);
    assert!((mean.vr - 324.0).abs() < 1e-9, "mean vr {}", mean.vr);
}

#[test]
fn bin_without_secondary_reports_zero() {
    let tmp = TempDir::new().unwrap();
    let summary = run(fixture(&tmp)).unwrap();
    let stats = read_statistics(&summary.statistics_file).unwrap();

    let second = &stats.counts[1];
    assert_eq!((second.bin_lo, second.bin_hi), (12.0, 13.0));
    assert_eq!((second.primary, second.secondary), (2, 0));
    // Five statistic kinds per non-empty bin
    assert_eq!(stats.rows.len(), 10);
}

#[test]
fn fill_values_never_reach_outputs() {
    let tmp = TempDir::new().unwrap();
    let summary = run(fixture(&tmp)).unwrap();

    assert!(!tmp.path().join("STATISTICS/BINNED_DATA/BIN_14-15.json").exists());
    let primary = summary.encounters[0].primary;
    assert_eq!(primary.raw, 6);
    assert_eq!(primary.filtered, 5);

    let stats = read_statistics(&summary.statistics_file).unwrap();
    assert!(stats.rows.iter().all(|r| r.vr.is_finite() && r.vr > 0.0));
}

#[test]
fn execution_log_lists_encounter() {
    let tmp = TempDir::new().unwrap();
    let summary = run(fixture(&tmp)).unwrap();
    let log = fs::read_to_string(&summary.log_file).unwrap();
    assert!(log.starts_with("Logging execution of calculation routine."));
    assert!(log.contains(ENCOUNTER));
    assert!(log.contains("data points: 7"));
}

// ============================================================================
// Reruns and failures
// ============================================================================

#[test]
fn rerun_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let config = fixture(&tmp);

    // A stale table from an earlier, different run must disappear
    write(tmp.path(), "STATISTICS/BINNED_DATA/BIN_30-31.json", "{}");

    let first = run(config.clone()).unwrap();
    let stats_first = fs::read_to_string(&first.statistics_file).unwrap();
    let second = run(config).unwrap();

    assert_eq!(first.bin_files, second.bin_files);
    assert_eq!(first.segment_files, second.segment_files);
    assert_eq!(stats_first, fs::read_to_string(&second.statistics_file).unwrap());
    assert!(!tmp.path().join("STATISTICS/BINNED_DATA/BIN_30-31.json").exists());
}

#[test]
fn missing_encounter_directory_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let mut config = fixture(&tmp);
    config.encounters.names.push("encounter_absent".to_string());

    assert!(matches!(run(config), Err(PipelineError::MissingDirectory(_))));
}

#[test]
fn missing_instrument_directory_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let config = fixture(&tmp);
    fs::remove_dir_all(config.paths.data_root.join(ENCOUNTER).join("secondary")).unwrap();

    assert!(matches!(run(config), Err(PipelineError::MissingDirectory(_))));
}

#[test]
fn failed_rerun_leaves_no_stale_outputs() {
    let tmp = TempDir::new().unwrap();
    let config = fixture(&tmp);
    let first = run(config.clone()).unwrap();
    assert!(first.statistics_file.exists());
    assert!(first.log_file.exists());

    let mut broken = config;
    broken.encounters.names.push("encounter_absent".to_string());
    assert!(matches!(run(broken), Err(PipelineError::MissingDirectory(_))));

    assert!(!first.statistics_file.exists(), "statistics.json from the earlier run survived");
    assert!(!first.log_file.exists());
    assert_eq!(fs::read_dir(tmp.path().join("STATISTICS/BINNED_DATA")).unwrap().count(), 0);
}
