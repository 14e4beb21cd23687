//! Config Validation Tests
//!
//! Typo detection on raw TOML and range validation on parsed configs,
//! exercised through the public config API only.

use std::io::Write;

use helioprofile::config::validation::{
    known_config_keys, suggest_correction, validate_physical_ranges, validate_unknown_keys,
};
use helioprofile::config::{CeilingBoundary, ConfigError, DistanceLabel, PipelineConfig};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_binning_key_warns_with_suggestion() {
    let toml_str = r#"
[binning]
bin_widht = 0.5
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("bin_widht"));
    assert_eq!(warnings[0].suggestion.as_deref(), Some("binning.bin_width"));
}

#[test]
fn typo_in_section_name_warns() {
    let toml_str = r#"
[averagin]
window_secs = 10.0
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(!warnings.is_empty());
    assert!(warnings.iter().any(|w| w.suggestion.as_deref() == Some("averaging")));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[paths]
data_root = "DATA"
statistics_dir = "STATISTICS"

[encounters]
names = ["encounter_7", "encounter_8"]

[binning]
bin_width = 0.5
ceiling = 40.0
ceiling_boundary = "inclusive"
distance_label = "centre"

[quality]
secondary_bad_bits = [0, 1, 2]
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.is_empty(), "Unexpected warnings: {warnings:?}");
}

#[test]
fn garbage_key_gets_no_suggestion() {
    let known = known_config_keys();
    assert_eq!(suggest_correction("zzzzzzzzzzzz", &known), None);
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn enum_settings_parse_from_snake_case() {
    let config = PipelineConfig::from_toml_str(
        r#"
[binning]
ceiling_boundary = "inclusive"
distance_label = "centre"
"#,
    )
    .unwrap();
    assert_eq!(config.binning.ceiling_boundary, CeilingBoundary::Inclusive);
    assert_eq!(config.binning.distance_label, DistanceLabel::Centre);
    // Untouched fields keep their defaults
    assert_eq!(config.binning.bin_width, PipelineConfig::default().binning.bin_width);
}

#[test]
fn load_from_file_reports_path_on_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[binning]\nbin_width = \"wide\"").unwrap();

    match PipelineConfig::load_from_file(file.path()) {
        Err(ConfigError::Parse(path, _)) => assert_eq!(path, file.path()),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn show_config_output_loads_back() {
    let mut config = PipelineConfig::default();
    config.binning.bin_width = 0.25;
    config.encounters.names = vec!["encounter_10".into()];

    let text = config.to_toml_string().unwrap();
    assert!(validate_unknown_keys(&text).is_empty());
    assert_eq!(PipelineConfig::from_toml_str(&text).unwrap(), config);
}

// ============================================================================
// Range Validation
// ============================================================================

#[test]
fn defaults_pass_range_validation() {
    let (errors, warnings) = validate_physical_ranges(&PipelineConfig::default());
    assert!(errors.is_empty(), "{errors:?}");
    assert!(warnings.is_empty(), "{warnings:?}");
}

#[test]
fn zero_bin_width_rejected() {
    let mut config = PipelineConfig::default();
    config.binning.bin_width = 0.0;
    assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
}

#[test]
fn domain_that_does_not_tile_rejected() {
    let mut config = PipelineConfig::default();
    config.binning.bin_width = 3.0;
    match config.validate() {
        Err(ConfigError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("equal bins")), "{errors:?}");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn same_instrument_folders_rejected() {
    let mut config = PipelineConfig::default();
    config.encounters.secondary_dir = config.encounters.primary_dir.clone();
    assert!(config.validate().is_err());
}

#[test]
fn ceiling_off_bin_edge_only_warns() {
    let mut config = PipelineConfig::default();
    config.binning.bin_width = 0.5;
    config.binning.ceiling = 39.8;

    let (errors, warnings) = validate_physical_ranges(&config);
    assert!(errors.is_empty());
    assert!(warnings.iter().any(|w| w.field == "binning.ceiling"));
    assert!(config.validate().is_ok());
}
